pub mod datatable;
pub mod descriptor;
pub mod field;
pub mod item;
pub mod metadata;
pub mod permission;
pub mod sort;

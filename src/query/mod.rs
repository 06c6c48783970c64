//! Query text assembly: paginated list queries, autocompletion and the
//! named-parameter scanner shared by both.

pub mod autocomplete;
pub mod errors;
pub mod paged;
pub mod sql;
pub mod value;

pub use paged::PagedQuery;
pub use value::{QueryParams, QueryValue};

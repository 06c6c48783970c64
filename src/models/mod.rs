//! Diesel row models backing the exposed resources.

use diesel::QueryableByName;
use diesel::sqlite::Sqlite;

use crate::domain::field::Resource;

#[cfg(feature = "server")]
pub mod config;
pub mod item;

/// A resource whose rows are loaded through a Diesel model.
pub trait Persisted: Resource {
    type Model: QueryableByName<Sqlite> + Into<Self> + 'static;
}

use crate::db::{DbConnection, DbPool, get_connection};
use crate::query::value::{QueryParams, QueryValue};
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod executor;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod writer;

/// Row window applied to a result query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub start: Option<u64>,
    pub limit: Option<u64>,
}

/// Column assignments for an insert or update, in column order.
pub type Assignments = Vec<(String, QueryValue)>;

/// Runs query text with `:named` parameters and maps rows to `T`.
pub trait QueryExecutor<T> {
    /// Runs a query projecting a single `count` column.
    fn count(&self, sql: &str, params: &QueryParams) -> RepositoryResult<u64>;
    fn fetch(&self, sql: &str, params: &QueryParams, window: Window) -> RepositoryResult<Vec<T>>;
}

/// Runs a query projecting a single text `value` column.
pub trait ValueQuery {
    fn fetch_values(
        &self,
        sql: &str,
        params: &QueryParams,
        limit: u64,
    ) -> RepositoryResult<Vec<String>>;
}

/// Writes rows of a resource table addressed by an integer key.
pub trait ResourceWriter {
    /// Inserts a row and returns its key.
    fn insert(&self, table: &str, values: &[(String, QueryValue)]) -> RepositoryResult<i64>;
    /// Returns the number of updated rows.
    fn update(
        &self,
        table: &str,
        key: &str,
        id: i64,
        values: &[(String, QueryValue)],
    ) -> RepositoryResult<usize>;
    /// Returns the number of deleted rows.
    fn delete(&self, table: &str, key: &str, id: i64) -> RepositoryResult<usize>;
}

/// Diesel-backed implementation of the repository traits.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

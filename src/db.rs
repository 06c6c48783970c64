//! Database connection helpers.
//!
//! Resource tables live in a single SQLite database reached through a Diesel
//! r2d2 pool. Every connection is tuned on checkout with SQLite pragmas and
//! the SQL functions query text relies on.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sql_types::{Nullable, Text};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

diesel::define_sql_function! {
    /// Unicode-aware `lower()`; SQLite's builtin only folds ASCII letters.
    fn unicode_lower(value: Nullable<Text>) -> Nullable<Text>;
}

/// Registers the SQL functions query text relies on.
fn register_functions(conn: &mut SqliteConnection) -> diesel::QueryResult<()> {
    unicode_lower_utils::register_impl(conn, |value: Option<String>| {
        value.map(|v| v.to_lowercase())
    })
}

#[derive(Debug, Clone, Copy)]
/// Options that are applied each time a connection is acquired from the pool.
struct ConnectionOptions {
    /// Enable Write Ahead Logging mode for SQLite.
    pub enable_wal: bool,
    /// Enforce foreign key checks for SQLite.
    pub enable_foreign_keys: bool,
    /// Timeout to wait for a locked database.
    pub busy_timeout: Option<Duration>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            enable_wal: true,
            enable_foreign_keys: true,
            busy_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ConnectionOptions {
    fn pragmas(&self) -> String {
        let mut pragmas = String::new();
        if self.enable_wal {
            pragmas.push_str("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
        }
        if self.enable_foreign_keys {
            pragmas.push_str("PRAGMA foreign_keys = ON;");
        }
        if let Some(timeout) = self.busy_timeout {
            pragmas.push_str(&format!("PRAGMA busy_timeout = {};", timeout.as_millis()));
        }
        pragmas
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        register_functions(conn).map_err(diesel::r2d2::Error::QueryError)?;
        let pragmas = self.pragmas();
        if pragmas.is_empty() {
            return Ok(());
        }
        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a Diesel connection pool for the given database URL with the
/// default connection options.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
}

/// Retrieve a connection from the pool
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, PoolError> {
    pool.get().inspect_err(|e| {
        log::error!("Failed to get connection from pool: {e}");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_enable_every_pragma() {
        let pragmas = ConnectionOptions::default().pragmas();

        assert!(pragmas.contains("journal_mode = WAL"));
        assert!(pragmas.contains("foreign_keys = ON"));
        assert!(pragmas.ends_with("PRAGMA busy_timeout = 30000;"));
    }

    #[test]
    fn disabled_options_issue_no_pragmas() {
        let options = ConnectionOptions {
            enable_wal: false,
            enable_foreign_keys: false,
            busy_timeout: None,
        };

        assert!(options.pragmas().is_empty());
    }

    #[test]
    fn acquired_connections_fold_non_ascii_case() {
        use diesel::{Connection, RunQueryDsl};

        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        ConnectionOptions::default().on_acquire(&mut conn).unwrap();

        let lowered: Option<String> = diesel::select(unicode_lower(Some("ЛАМПА Straße")))
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(lowered.as_deref(), Some("лампа straße"));

        let lowered: Option<String> = diesel::select(unicode_lower(None::<String>))
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(lowered, None);
    }
}

//! Shared helpers for integration tests.

#![allow(dead_code)]

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_crud::db::{DbPool, establish_connection_pool};
use pushkind_crud::schema::items;
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// A migrated SQLite database removed when dropped.
pub struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path")).expect("pool");

        let mut conn = pool.get().expect("connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("migrations");

        Self { pool, _dir: dir }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Inserts `count` items named `Item 01`, `Item 02`, ... alternating
    /// between the `Books` and `Tools` categories.
    pub fn seed_items(&self, count: usize) {
        let created_at =
            NaiveDateTime::parse_from_str("2025-01-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let rows: Vec<_> = (1..=count)
            .map(|n| {
                (
                    items::name.eq(format!("Item {n:02}")),
                    items::category.eq(Some(if n % 2 == 0 { "Books" } else { "Tools" })),
                    items::price.eq(n as f64),
                    items::active.eq(true),
                    items::created_at.eq(created_at),
                )
            })
            .collect();

        let mut conn = self.pool.get().expect("connection");
        diesel::insert_into(items::table)
            .values(rows)
            .execute(&mut conn)
            .expect("seed items");
    }
}

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use fileshelf::storage::{create_pool, DbPool};
use tempfile::TempDir;

/// A migrated SQLite database in a temporary directory.
///
/// Keep the struct alive for the duration of the test; dropping it removes
/// the directory.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    _dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("bot.db");
        let pool = create_pool(path.to_str().expect("Non-UTF-8 temp path")).expect("Failed to create pool");
        Self {
            pool: Arc::new(pool),
            _dir: dir,
        }
    }

    pub fn conn(&self) -> fileshelf::DbConnection {
        fileshelf::get_connection(&self.pool).expect("Failed to get connection")
    }
}

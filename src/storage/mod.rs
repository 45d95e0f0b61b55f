//! SQLite persistence: pool, migrations and per-table queries

pub mod broadcasts;
pub mod categories;
pub mod db;
pub mod files;
pub mod migrations;
pub mod pending;
pub mod subscribers;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::core::error::{AppError, AppResult};
use crate::storage::migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections, enables foreign
/// key enforcement on every pooled connection and runs schema migrations.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use fileshelf::storage::db;
///
/// let pool = db::create_pool("bot.db")?;
/// # Ok::<(), fileshelf::core::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|c| {
        c.execute_batch("PRAGMA foreign_keys = ON;")?;
        c.busy_timeout(std::time::Duration::from_secs(5))
    });
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let mut conn = pool.get()?;
    migrations::run_migrations(&mut conn).map_err(AppError::Migration)?;
    log::info!("Database ready at {}", database_path);

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    Ok(pool.get()?)
}

/// Timestamp stored in `created_at`/`joined_at`/`uploaded_at`/`sent_at` columns.
///
/// Microsecond precision keeps rows created in quick succession ordered.
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Fresh identifier for categories, files, pending files and broadcasts.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// In-memory, migrated connection for unit tests.
#[cfg(test)]
pub(crate) fn test_connection() -> rusqlite::Connection {
    let mut conn = rusqlite::Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("PRAGMA foreign_keys = ON;").expect("enable foreign keys");
    migrations::run_migrations_for_test(&mut conn).expect("migrate in-memory db");
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_pool_runs_migrations() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("shelf.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        let conn = get_connection(&pool).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                 ('categories', 'files', 'subscribers', 'pending_files', 'broadcast_messages')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 5);

        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_create_pool_is_idempotent() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("shelf.db");
        let path = path.to_str().unwrap();
        drop(create_pool(path).unwrap());
        assert!(create_pool(path).is_ok());
    }

    #[test]
    fn test_now_timestamp_is_sortable() {
        let a = now_timestamp();
        let b = now_timestamp();
        assert!(a <= b);
        assert_eq!(a.len(), "2024-01-01T00:00:00.000000".len());
    }
}

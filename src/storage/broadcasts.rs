//! Append-only log of sent broadcasts.

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::core::error::AppResult;
use crate::storage::db::{new_id, now_timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastRecord {
    pub id: String,
    pub message: String,
    pub sent_at: String,
    pub sent_to_count: i64,
    pub failed_count: i64,
}

pub fn insert_broadcast(conn: &Connection, message: &str, sent_to_count: i64, failed_count: i64) -> AppResult<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO broadcast_messages (id, message, sent_at, sent_to_count, failed_count)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, message, now_timestamp(), sent_to_count, failed_count],
    )?;
    Ok(id)
}

/// Most recent broadcasts first.
pub fn list_broadcasts(conn: &Connection, limit: usize) -> AppResult<Vec<BroadcastRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, message, sent_at, sent_to_count, failed_count
         FROM broadcast_messages
         ORDER BY sent_at DESC, rowid DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(BroadcastRecord {
            id: row.get(0)?,
            message: row.get(1)?,
            sent_at: row.get(2)?,
            sent_to_count: row.get(3)?,
            failed_count: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

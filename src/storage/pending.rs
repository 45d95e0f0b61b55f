//! Staging area for documents the admin uploaded to the bot.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::core::error::AppResult;
use crate::storage::db::{new_id, now_timestamp};
use crate::storage::files::{insert_file, NewFile};

/// An uploaded document awaiting a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingFile {
    pub id: String,
    pub telegram_file_id: String,
    pub name: String,
    pub size: Option<i64>,
    pub mime_type: Option<String>,
    pub uploaded_at: String,
}

impl PendingFile {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PendingFile {
            id: row.get(0)?,
            telegram_file_id: row.get(1)?,
            name: row.get(2)?,
            size: row.get(3)?,
            mime_type: row.get(4)?,
            uploaded_at: row.get(5)?,
        })
    }
}

#[derive(Debug)]
pub struct NewPendingFile<'a> {
    pub telegram_file_id: &'a str,
    pub name: &'a str,
    pub size: Option<i64>,
    pub mime_type: Option<&'a str>,
}

const SELECT_PENDING: &str = "SELECT id, telegram_file_id, name, size, mime_type, uploaded_at FROM pending_files";

pub fn insert_pending(conn: &Connection, pending: &NewPendingFile<'_>) -> AppResult<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO pending_files (id, telegram_file_id, name, size, mime_type, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            pending.telegram_file_id,
            pending.name,
            pending.size,
            pending.mime_type,
            now_timestamp()
        ],
    )?;
    Ok(id)
}

pub fn get_pending(conn: &Connection, id: &str) -> AppResult<Option<PendingFile>> {
    let sql = format!("{} WHERE id = ?1", SELECT_PENDING);
    Ok(conn.query_row(&sql, params![id], PendingFile::from_row).optional()?)
}

pub fn list_pending(conn: &Connection) -> AppResult<Vec<PendingFile>> {
    let sql = format!("{} ORDER BY uploaded_at, rowid", SELECT_PENDING);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], PendingFile::from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn delete_pending(conn: &Connection, id: &str) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM pending_files WHERE id = ?1", params![id])? > 0)
}

pub fn count_pending(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM pending_files", [], |row| row.get(0))?)
}

/// Files a pending upload under `category_id` and removes it from staging.
///
/// The content handle, size and MIME type are carried over unchanged. Both
/// writes happen in one transaction. Returns the new file id, or `None`
/// when the pending upload no longer exists.
pub fn promote_pending(
    conn: &mut Connection,
    pending_id: &str,
    name: &str,
    category_id: &str,
    description: Option<&str>,
) -> AppResult<Option<String>> {
    let tx = conn.transaction()?;

    let Some(pending) = get_pending(&tx, pending_id)? else {
        return Ok(None);
    };

    let file_id = insert_file(
        &tx,
        &NewFile {
            name,
            category_id,
            telegram_file_id: Some(&pending.telegram_file_id),
            description,
            size: pending.size,
            mime_type: pending.mime_type.as_deref(),
        },
    )?;
    delete_pending(&tx, pending_id)?;

    tx.commit()?;
    Ok(Some(file_id))
}

//! File rows and the name search.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::core::error::AppResult;
use crate::storage::db::{new_id, now_timestamp};

/// A distributable file filed under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub category_id: String,
    /// Telegram `file_id` used to re-send the document
    pub telegram_file_id: Option<String>,
    pub description: Option<String>,
    /// Size in bytes
    pub size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_at: String,
}

impl FileEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(FileEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            category_id: row.get(2)?,
            telegram_file_id: row.get(3)?,
            description: row.get(4)?,
            size: row.get(5)?,
            mime_type: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    pub fn is_deliverable(&self) -> bool {
        self.telegram_file_id.as_deref().is_some_and(|h| !h.is_empty())
    }
}

/// Parameters for inserting a file
#[derive(Debug)]
pub struct NewFile<'a> {
    pub name: &'a str,
    pub category_id: &'a str,
    pub telegram_file_id: Option<&'a str>,
    pub description: Option<&'a str>,
    pub size: Option<i64>,
    pub mime_type: Option<&'a str>,
}

/// A file together with the name of its category, for admin listings.
#[derive(Debug, Clone, Serialize)]
pub struct FileListing {
    pub file: FileEntry,
    pub category_name: String,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub category_name: String,
    pub size: Option<i64>,
}

const SELECT_FILE: &str =
    "SELECT id, name, category_id, telegram_file_id, description, size, mime_type, created_at FROM files";

/// Category name shown when a file's category cannot be resolved.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

pub fn insert_file(conn: &Connection, file: &NewFile<'_>) -> AppResult<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO files (id, name, category_id, telegram_file_id, description, size, mime_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            file.name,
            file.category_id,
            file.telegram_file_id,
            file.description,
            file.size,
            file.mime_type,
            now_timestamp()
        ],
    )?;
    Ok(id)
}

pub fn get_file(conn: &Connection, id: &str) -> AppResult<Option<FileEntry>> {
    let sql = format!("{} WHERE id = ?1", SELECT_FILE);
    Ok(conn.query_row(&sql, params![id], FileEntry::from_row).optional()?)
}

pub fn list_files(conn: &Connection) -> AppResult<Vec<FileEntry>> {
    let sql = format!("{} ORDER BY created_at, rowid", SELECT_FILE);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], FileEntry::from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn list_files_in_category(conn: &Connection, category_id: &str) -> AppResult<Vec<FileEntry>> {
    let sql = format!("{} WHERE category_id = ?1 ORDER BY created_at, rowid", SELECT_FILE);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![category_id], FileEntry::from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Every file with its category name, newest last.
pub fn list_files_with_category(conn: &Connection) -> AppResult<Vec<FileListing>> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.name, f.category_id, f.telegram_file_id, f.description, f.size, f.mime_type, f.created_at,
                c.name
         FROM files f
         LEFT JOIN categories c ON c.id = f.category_id
         ORDER BY f.created_at, f.rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(FileListing {
            file: FileEntry::from_row(row)?,
            category_name: row
                .get::<_, Option<String>>(8)?
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Rewrites the editable fields of a file. The stored size and MIME type are kept.
///
/// Returns `false` when no file has this id.
pub fn update_file(
    conn: &Connection,
    id: &str,
    name: &str,
    category_id: &str,
    description: Option<&str>,
    telegram_file_id: Option<&str>,
) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE files SET name = ?1, category_id = ?2, description = ?3, telegram_file_id = ?4 WHERE id = ?5",
        params![name, category_id, description, telegram_file_id, id],
    )?;
    Ok(changed > 0)
}

pub fn delete_file(conn: &Connection, id: &str) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM files WHERE id = ?1", params![id])? > 0)
}

pub fn count_files(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?)
}

/// Escapes `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 2);
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Case-insensitive substring search over file names.
///
/// A blank query matches nothing. At most `limit` hits are returned, in store order.
pub fn search_files(conn: &Connection, query: &str, limit: usize) -> AppResult<Vec<SearchHit>> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let pattern = format!("%{}%", escape_like(query));
    let mut stmt = conn.prepare(
        "SELECT f.id, f.name, c.name, f.size
         FROM files f
         LEFT JOIN categories c ON c.id = f.category_id
         WHERE f.name LIKE ?1 ESCAPE '\\'
         ORDER BY f.created_at, f.rowid
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![pattern, limit as i64], |row| {
        Ok(SearchHit {
            id: row.get(0)?,
            name: row.get(1)?,
            category_name: row
                .get::<_, Option<String>>(2)?
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            size: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::categories::insert_category;
    use crate::storage::db::test_connection;

    fn add(conn: &Connection, name: &str, category_id: &str) -> String {
        insert_file(
            conn,
            &NewFile {
                name,
                category_id,
                telegram_file_id: Some("BQACAgIAAxkBAAI"),
                description: None,
                size: Some(2048),
                mime_type: Some("application/octet-stream"),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_insert_get_update_delete() {
        let conn = test_connection();
        let apps = insert_category(&conn, "Apps", None, None).unwrap();
        let games = insert_category(&conn, "Games", None, None).unwrap();
        let id = add(&conn, "demo.apk", &apps);

        let file = get_file(&conn, &id).unwrap().unwrap();
        assert_eq!(file.name, "demo.apk");
        assert_eq!(file.size, Some(2048));
        assert!(file.is_deliverable());

        assert!(update_file(&conn, &id, "demo-v2.apk", &games, Some("New build"), None).unwrap());
        let file = get_file(&conn, &id).unwrap().unwrap();
        assert_eq!(file.category_id, games);
        assert_eq!(file.description.as_deref(), Some("New build"));
        assert!(!file.is_deliverable());
        assert_eq!(file.mime_type.as_deref(), Some("application/octet-stream"));

        assert!(delete_file(&conn, &id).unwrap());
        assert!(!delete_file(&conn, &id).unwrap());
        assert_eq!(count_files(&conn).unwrap(), 0);
    }

    #[test]
    fn test_category_must_exist() {
        let conn = test_connection();
        let new = NewFile {
            name: "stray.zip",
            category_id: "missing",
            telegram_file_id: None,
            description: None,
            size: None,
            mime_type: None,
        };
        assert!(insert_file(&conn, &new).is_err());
    }

    #[test]
    fn test_list_files_with_category_names() {
        let conn = test_connection();
        let apps = insert_category(&conn, "Apps", None, None).unwrap();
        add(&conn, "a.apk", &apps);
        add(&conn, "b.apk", &apps);
        let listing = list_files_with_category(&conn).unwrap();
        let names: Vec<(&str, &str)> = listing
            .iter()
            .map(|l| (l.file.name.as_str(), l.category_name.as_str()))
            .collect();
        assert_eq!(names, vec![("a.apk", "Apps"), ("b.apk", "Apps")]);
        assert_eq!(list_files_in_category(&conn, &apps).unwrap().len(), 2);
    }

    #[test]
    fn test_search_single_and_no_match() {
        let conn = test_connection();
        let apps = insert_category(&conn, "Apps", None, None).unwrap();
        add(&conn, "Demo.apk", &apps);
        add(&conn, "manual.pdf", &apps);

        let hits = search_files(&conn, "demo", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Demo.apk");
        assert_eq!(hits[0].category_name, "Apps");

        assert!(search_files(&conn, "nothing-like-this", 20).unwrap().is_empty());
        assert!(search_files(&conn, "   ", 20).unwrap().is_empty());
    }

    #[test]
    fn test_search_is_capped() {
        let conn = test_connection();
        let apps = insert_category(&conn, "Apps", None, None).unwrap();
        for i in 0..25 {
            add(&conn, &format!("build-{}.apk", i), &apps);
        }
        assert_eq!(search_files(&conn, "build", 20).unwrap().len(), 20);
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let conn = test_connection();
        let apps = insert_category(&conn, "Apps", None, None).unwrap();
        add(&conn, "100% free.txt", &apps);
        add(&conn, "1000 tips.txt", &apps);
        add(&conn, "my_file.txt", &apps);
        add(&conn, "myXfile.txt", &apps);

        let hits = search_files(&conn, "100%", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100% free.txt");

        let hits = search_files(&conn, "my_", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "my_file.txt");
    }
}

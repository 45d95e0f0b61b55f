//! Category rows and the cascading delete.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::catalog::tree::CategoryTree;
use crate::core::error::AppResult;
use crate::storage::db::{new_id, now_timestamp};

/// A node in the category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// `None` for top-level categories
    pub parent_id: Option<String>,
    pub created_at: String,
}

impl Category {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            parent_id: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// What a cascading delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeReport {
    pub categories: usize,
    pub files: usize,
}

const SELECT_CATEGORY: &str = "SELECT id, name, description, parent_id, created_at FROM categories";

fn query_categories(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> AppResult<Vec<Category>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, Category::from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Inserts a category and returns its new id.
pub fn insert_category(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
    parent_id: Option<&str>,
) -> AppResult<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO categories (id, name, description, parent_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, description, parent_id, now_timestamp()],
    )?;
    Ok(id)
}

pub fn get_category(conn: &Connection, id: &str) -> AppResult<Option<Category>> {
    let sql = format!("{} WHERE id = ?1", SELECT_CATEGORY);
    Ok(conn.query_row(&sql, params![id], Category::from_row).optional()?)
}

pub fn category_exists(conn: &Connection, id: &str) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM categories WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// All categories in insertion order.
pub fn list_categories(conn: &Connection) -> AppResult<Vec<Category>> {
    let sql = format!("{} ORDER BY created_at, rowid", SELECT_CATEGORY);
    query_categories(conn, &sql, [])
}

pub fn list_root_categories(conn: &Connection) -> AppResult<Vec<Category>> {
    let sql = format!("{} WHERE parent_id IS NULL ORDER BY created_at, rowid", SELECT_CATEGORY);
    query_categories(conn, &sql, [])
}

pub fn list_subcategories(conn: &Connection, parent_id: &str) -> AppResult<Vec<Category>> {
    let sql = format!("{} WHERE parent_id = ?1 ORDER BY created_at, rowid", SELECT_CATEGORY);
    query_categories(conn, &sql, params![parent_id])
}

/// Renames a category and replaces its description.
///
/// Returns `false` when no category has this id.
pub fn update_category(conn: &Connection, id: &str, name: &str, description: Option<&str>) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE categories SET name = ?1, description = ?2 WHERE id = ?3",
        params![name, description, id],
    )?;
    Ok(changed > 0)
}

/// Loads the parent index for the whole table.
pub fn load_tree(conn: &Connection) -> AppResult<CategoryTree> {
    let mut stmt = conn.prepare("SELECT id, parent_id FROM categories ORDER BY created_at, rowid")?;
    let pairs = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(CategoryTree::from_pairs(pairs))
}

/// Deletes a category, every descendant category and every file filed
/// under any of them, as one transaction.
///
/// Returns `None` (and changes nothing) when the category does not exist.
pub fn delete_category_cascade(conn: &mut Connection, id: &str) -> AppResult<Option<CascadeReport>> {
    let tx = conn.transaction()?;

    let tree = load_tree(&tx)?;
    let doomed = tree.subtree_post_order(id);
    if doomed.is_empty() {
        return Ok(None);
    }

    let mut report = CascadeReport::default();
    {
        let mut delete_files = tx.prepare("DELETE FROM files WHERE category_id = ?1")?;
        let mut delete_category = tx.prepare("DELETE FROM categories WHERE id = ?1")?;
        // Post-order: children go before the parent they reference.
        for category_id in &doomed {
            report.files += delete_files.execute(params![category_id])?;
            report.categories += delete_category.execute(params![category_id])?;
        }
    }

    tx.commit()?;
    Ok(Some(report))
}

pub fn count_categories(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::test_connection;
    use crate::storage::files::{insert_file, list_files, NewFile};

    fn file<'a>(name: &'a str, category_id: &'a str) -> NewFile<'a> {
        NewFile {
            name,
            category_id,
            telegram_file_id: Some("tg-handle"),
            description: None,
            size: Some(1024),
            mime_type: None,
        }
    }

    #[test]
    fn test_insert_and_list_in_store_order() {
        let conn = test_connection();
        let apps = insert_category(&conn, "Apps", Some("Applications"), None).unwrap();
        let docs = insert_category(&conn, "Docs", None, None).unwrap();
        let games = insert_category(&conn, "Games", None, Some(&apps)).unwrap();

        let roots: Vec<String> = list_root_categories(&conn).unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(roots, vec![apps.clone(), docs]);

        let subs = list_subcategories(&conn, &apps).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, games);
        assert_eq!(subs[0].parent_id.as_deref(), Some(apps.as_str()));
        assert_eq!(count_categories(&conn).unwrap(), 3);
    }

    #[test]
    fn test_parent_must_exist() {
        let conn = test_connection();
        assert!(insert_category(&conn, "Orphan", None, Some("no-such-id")).is_err());
    }

    #[test]
    fn test_update_category() {
        let conn = test_connection();
        let id = insert_category(&conn, "Apps", None, None).unwrap();
        assert!(update_category(&conn, &id, "Applications", Some("All apps")).unwrap());
        let cat = get_category(&conn, &id).unwrap().unwrap();
        assert_eq!(cat.name, "Applications");
        assert_eq!(cat.description.as_deref(), Some("All apps"));
        assert!(!update_category(&conn, "missing", "x", None).unwrap());
    }

    #[test]
    fn test_delete_cascade_removes_descendants_and_files() {
        let mut conn = test_connection();
        let apps = insert_category(&conn, "Apps", None, None).unwrap();
        let games = insert_category(&conn, "Games", None, Some(&apps)).unwrap();
        let puzzles = insert_category(&conn, "Puzzles", None, Some(&games)).unwrap();
        let docs = insert_category(&conn, "Docs", None, None).unwrap();
        insert_file(&conn, &file("demo.apk", &games)).unwrap();
        insert_file(&conn, &file("sudoku.apk", &puzzles)).unwrap();
        insert_file(&conn, &file("readme.pdf", &docs)).unwrap();

        let report = delete_category_cascade(&mut conn, &apps).unwrap().unwrap();
        assert_eq!(report, CascadeReport { categories: 3, files: 2 });

        let left: Vec<String> = list_categories(&conn).unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(left, vec!["Docs"]);
        let files: Vec<String> = list_files(&conn).unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(files, vec!["readme.pdf"]);
    }

    #[test]
    fn test_delete_unknown_category_is_noop() {
        let mut conn = test_connection();
        insert_category(&conn, "Apps", None, None).unwrap();
        assert_eq!(delete_category_cascade(&mut conn, "missing").unwrap(), None);
        assert_eq!(count_categories(&conn).unwrap(), 1);
    }
}

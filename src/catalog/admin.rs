//! Catalog mutations behind the admin panel.
//!
//! Each operation validates its input before touching the store and
//! returns the success notice to flash. Validation and missing-row
//! failures come back as `AppError::Validation` / `AppError::NotFound`
//! with no state changed.

use rusqlite::Connection;
use serde::Serialize;

use crate::core::error::{AppError, AppResult};
use crate::storage::categories::{self, Category};
use crate::storage::files::{self, NewFile};
use crate::storage::{pending, subscribers};

/// Trims a form value and maps blank input to `None`.
pub fn clean(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: Option<&'a str>, message: &str) -> AppResult<&'a str> {
    clean(value).ok_or_else(|| AppError::Validation(message.to_string()))
}

fn ensure_category(conn: &Connection, id: &str, what: &'static str) -> AppResult<()> {
    if categories::category_exists(conn, id)? {
        Ok(())
    } else {
        Err(AppError::NotFound(what))
    }
}

pub fn add_category(
    conn: &Connection,
    name: Option<&str>,
    description: Option<&str>,
    parent_id: Option<&str>,
) -> AppResult<String> {
    let name = required(name, "Category name is required!")?;
    let parent_id = clean(parent_id);
    if let Some(parent) = parent_id {
        ensure_category(conn, parent, "Parent category")?;
    }

    let id = categories::insert_category(conn, name, clean(description), parent_id)?;
    log::info!("Category '{}' created ({})", name, id);
    Ok(format!("Category \"{}\" added successfully!", name))
}

pub fn edit_category(conn: &Connection, id: &str, name: Option<&str>, description: Option<&str>) -> AppResult<String> {
    let name = required(name, "Category name is required!")?;
    if !categories::update_category(conn, id, name, clean(description))? {
        return Err(AppError::NotFound("Category"));
    }
    Ok(format!("Category \"{}\" updated successfully!", name))
}

pub fn delete_category(conn: &mut Connection, id: &str) -> AppResult<String> {
    let category = categories::get_category(conn, id)?.ok_or(AppError::NotFound("Category"))?;
    let report = categories::delete_category_cascade(conn, id)?.ok_or(AppError::NotFound("Category"))?;
    log::info!(
        "Category '{}' deleted with {} categories and {} files",
        category.name,
        report.categories,
        report.files
    );
    Ok(format!("Category \"{}\" deleted successfully!", category.name))
}

pub fn add_file(
    conn: &Connection,
    name: Option<&str>,
    category_id: Option<&str>,
    description: Option<&str>,
    telegram_file_id: Option<&str>,
) -> AppResult<String> {
    let (name, category_id) = match (clean(name), clean(category_id)) {
        (Some(n), Some(c)) => (n, c),
        _ => return Err(AppError::Validation("File name and category are required!".into())),
    };
    ensure_category(conn, category_id, "Category")?;

    files::insert_file(
        conn,
        &NewFile {
            name,
            category_id,
            telegram_file_id: clean(telegram_file_id),
            description: clean(description),
            size: None,
            mime_type: None,
        },
    )?;
    Ok(format!("File \"{}\" added successfully!", name))
}

pub fn promote_pending(
    conn: &mut Connection,
    pending_id: &str,
    name: Option<&str>,
    category_id: Option<&str>,
    description: Option<&str>,
) -> AppResult<String> {
    let (name, category_id) = match (clean(name), clean(category_id)) {
        (Some(n), Some(c)) => (n, c),
        _ => return Err(AppError::Validation("Category and file name are required!".into())),
    };
    ensure_category(conn, category_id, "Category")?;

    pending::promote_pending(conn, pending_id, name, category_id, clean(description))?
        .ok_or(AppError::NotFound("Pending file"))?;
    Ok(format!("File \"{}\" added successfully!", name))
}

pub fn edit_file(
    conn: &Connection,
    id: &str,
    name: Option<&str>,
    category_id: Option<&str>,
    description: Option<&str>,
    telegram_file_id: Option<&str>,
) -> AppResult<String> {
    let (name, category_id) = match (clean(name), clean(category_id)) {
        (Some(n), Some(c)) => (n, c),
        _ => return Err(AppError::Validation("File name and category are required!".into())),
    };
    if files::get_file(conn, id)?.is_none() {
        return Err(AppError::NotFound("File"));
    }
    ensure_category(conn, category_id, "Category")?;

    files::update_file(conn, id, name, category_id, clean(description), clean(telegram_file_id))?;
    Ok(format!("File \"{}\" updated successfully!", name))
}

pub fn delete_file(conn: &Connection, id: &str) -> AppResult<String> {
    let file = files::get_file(conn, id)?.ok_or(AppError::NotFound("File"))?;
    files::delete_file(conn, id)?;
    Ok(format!("File \"{}\" deleted successfully!", file.name))
}

pub fn delete_pending(conn: &Connection, id: &str) -> AppResult<String> {
    let upload = pending::get_pending(conn, id)?.ok_or(AppError::NotFound("Pending file"))?;
    pending::delete_pending(conn, id)?;
    Ok(format!("Pending file \"{}\" removed.", upload.name))
}

/// Root category with its direct subcategories.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    pub category: Category,
    pub subcategories: Vec<Category>,
}

/// Category page data: the two-level tree plus the flat list for parent pickers.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOverview {
    pub roots: Vec<CategoryNode>,
    pub all: Vec<Category>,
}

pub fn category_overview(conn: &Connection) -> AppResult<CategoryOverview> {
    let all = categories::list_categories(conn)?;
    let roots = all
        .iter()
        .filter(|c| c.is_root())
        .map(|root| CategoryNode {
            category: root.clone(),
            subcategories: all
                .iter()
                .filter(|c| c.parent_id.as_deref() == Some(root.id.as_str()))
                .cloned()
                .collect(),
        })
        .collect();
    Ok(CategoryOverview { roots, all })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_categories: i64,
    pub total_files: i64,
    pub total_subscribers: i64,
    pub pending_files: i64,
}

pub fn dashboard_stats(conn: &Connection) -> AppResult<DashboardStats> {
    Ok(DashboardStats {
        total_categories: categories::count_categories(conn)?,
        total_files: files::count_files(conn)?,
        total_subscribers: subscribers::count_active_subscribers(conn)?,
        pending_files: pending::count_pending(conn)?,
    })
}

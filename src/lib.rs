//! Fileshelf - Telegram file distribution bot with a web admin panel
//!
//! Chat users browse a category tree, search by name and receive files
//! that were uploaded once to Telegram. The admin curates the catalog and
//! sends broadcasts from the web panel.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and formatting helpers
//! - `storage`: SQLite pool, migrations and per-table access
//! - `catalog`: Navigation, search and admin operations over the catalog
//! - `broadcast`: Fan-out of announcements to active subscribers
//! - `telegram`: Bot listener and update handlers
//! - `web`: Admin panel routes and pages

pub mod broadcast;
pub mod catalog;
pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;
pub mod web;

// Re-export commonly used types for convenience
pub use self::core::{config, AppError, AppResult};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
pub use telegram::{create_bot, schema, HandlerDeps};
pub use web::{router, WebState};

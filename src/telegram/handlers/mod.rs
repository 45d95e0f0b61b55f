//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.
//! Handlers read their dependencies from `HandlerDeps`, so tests can build
//! the same tree as production code.

mod callbacks;
mod commands;
mod schema;
mod text;
mod types;
mod uploads;

pub use schema::schema;
pub use types::{register_subscriber, HandlerDeps, HandlerError, SearchSessions};

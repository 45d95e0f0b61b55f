//! Telegram bot integration and handlers

pub mod bot;
pub mod delivery;
pub mod handlers;
pub mod keyboard;

pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, run_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError, SearchSessions};

//! Bot initialization and the supervised polling loop
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - The dispatcher loop and its restart supervisor

use std::sync::Arc;

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use teloxide::utils::command::BotCommands;
use tokio::time::sleep;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::storage::DbPool;
use crate::telegram::handlers::{schema, HandlerDeps, SearchSessions};
use crate::telegram::Bot;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    /// `/start` with an optional `file_<id>` deep-link payload
    #[command(description = "show the main menu")]
    Start(String),
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Invalid BOT_API_URL or HTTP client setup failure
pub fn create_bot(token: &str) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    let bot = match config::BOT_API_URL.as_deref() {
        Some(api_url) => {
            log::info!("Using custom Bot API URL: {}", api_url);
            let url = url::Url::parse(api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Token and admin id the listener needs, or a configuration error.
pub fn bot_credentials() -> AppResult<(String, i64)> {
    if config::BOT_TOKEN.is_empty() {
        return Err(AppError::Config("TELEGRAM_BOT_TOKEN not provided!".to_string()));
    }
    let admin_id =
        config::admin_user_id().ok_or_else(|| AppError::Config("ADMIN_ID not provided!".to_string()))?;
    Ok((config::BOT_TOKEN.clone(), admin_id))
}

/// Connects, registers commands and runs long polling until shutdown.
///
/// Returns `Ok` on a graceful stop (Ctrl-C) and `Err` when startup or the
/// dispatcher task fails.
pub async fn run_bot(token: &str, admin_id: i64, db_pool: Arc<DbPool>) -> anyhow::Result<()> {
    let bot = create_bot(token)?;

    let me = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Bot API: {}", e))?;
    let bot_username = me.username.clone();
    log::info!("Bot username: {:?}, Bot ID: {}", bot_username, me.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let deps = HandlerDeps::new(db_pool, admin_id, bot_username, Arc::new(SearchSessions::default()));
    let handler = schema(deps);

    log::info!("Starting bot in long polling mode (admin ID: {})", admin_id);

    // Run the dispatcher in its own task so a panic surfaces as a JoinError
    let handle = tokio::spawn(async move {
        let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await
    });

    match handle.await {
        Ok(()) => {
            log::info!("Dispatcher shutdown gracefully");
            Ok(())
        }
        Err(join_err) => Err(anyhow::anyhow!("Dispatcher task failed: {}", join_err)),
    }
}

/// Keeps the bot listener alive, restarting it after a fixed delay.
///
/// Configuration errors are returned immediately and never retried.
pub async fn supervise_bot(db_pool: Arc<DbPool>) -> AppResult<()> {
    let (token, admin_id) = bot_credentials()?;

    loop {
        match run_bot(&token, admin_id, Arc::clone(&db_pool)).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                log::error!(
                    "Bot listener stopped with an error: {}. Restarting in {}s...",
                    e,
                    config::bot::RESTART_DELAY_SECS
                );
                sleep(config::bot::restart_delay()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_command_parses_deep_link_payload() {
        assert_eq!(
            Command::parse("/start file_abc", "shelf_bot").unwrap(),
            Command::Start("file_abc".to_string())
        );
        assert_eq!(Command::parse("/start", "shelf_bot").unwrap(), Command::Start(String::new()));
    }

    #[test]
    fn test_commands_are_registered() {
        let commands = Command::bot_commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].command.ends_with("start"));
    }
}

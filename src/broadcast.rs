//! One-to-many announcements to active subscribers.
//!
//! Delivery goes through the [`BroadcastSender`] trait so the web panel can
//! drive the same fan-out against the Telegram bot or a test double.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::core::error::{AppError, AppResult};
use crate::storage::db::DbPool;
use crate::storage::{broadcasts, get_connection, subscribers};
use crate::telegram::Bot;

/// Sends one text message to one chat user.
#[async_trait]
pub trait BroadcastSender: Send + Sync {
    async fn send_text(&self, user_id: i64, text: &str) -> AppResult<()>;
}

/// Delivers broadcasts through the Bot API with HTML formatting.
pub struct TelegramBroadcastSender {
    bot: Bot,
}

impl TelegramBroadcastSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl BroadcastSender for TelegramBroadcastSender {
    async fn send_text(&self, user_id: i64, text: &str) -> AppResult<()> {
        self.bot
            .send_message(ChatId(user_id), text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

/// Result of a broadcast run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// Every active subscriber got one attempt; the tally was recorded
    Sent {
        record_id: String,
        sent: i64,
        failed: i64,
    },
    /// Nobody to send to; nothing was recorded
    NoSubscribers,
}

impl BroadcastOutcome {
    pub fn summary(&self) -> String {
        match self {
            BroadcastOutcome::Sent { sent, failed, .. } => {
                format!("Broadcast sent to {} subscribers! {} failed.", sent, failed)
            }
            BroadcastOutcome::NoSubscribers => "No active subscribers found!".to_string(),
        }
    }
}

/// Sends `text` to every active subscriber, one attempt each.
///
/// Per-recipient failures are logged and counted, never fatal. The final
/// tally is persisted as a single broadcast record.
///
/// # Errors
/// `AppError::Validation` for blank text; store errors while loading
/// subscribers or writing the record.
pub async fn send_broadcast(pool: &DbPool, sender: &dyn BroadcastSender, text: &str) -> AppResult<BroadcastOutcome> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Message is required!".to_string()));
    }

    let recipients = {
        let conn = get_connection(pool)?;
        subscribers::list_active_subscribers(&conn)?
    };
    if recipients.is_empty() {
        log::warn!("Broadcast skipped: no active subscribers");
        return Ok(BroadcastOutcome::NoSubscribers);
    }

    log::info!("Broadcasting to {} subscribers", recipients.len());
    let mut sent = 0i64;
    let mut failed = 0i64;
    for subscriber in &recipients {
        match sender.send_text(subscriber.user_id, text).await {
            Ok(()) => sent += 1,
            Err(e) => {
                log::error!("Failed to send to {}: {}", subscriber.user_id, e);
                failed += 1;
            }
        }
    }

    let record_id = {
        let conn = get_connection(pool)?;
        broadcasts::insert_broadcast(&conn, text, sent, failed)?
    };
    log::info!("Broadcast {} finished: {} sent, {} failed", record_id, sent, failed);

    Ok(BroadcastOutcome::Sent { record_id, sent, failed })
}

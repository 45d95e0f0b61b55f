//! Sends stored documents back to chat users.

use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile};

use crate::catalog::navigator::{FILE_NOT_FOUND, SEND_FAILED};
use crate::core::error::AppResult;
use crate::storage::{files, get_connection, DbPool};
use crate::telegram::Bot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    NotFound,
    Failed,
}

/// Sends the document for `file_id` to `chat_id`, with caption `📄 <name>`.
///
/// A missing row yields "File not found."; a missing content handle or a
/// transport failure yields the generic send error. There is no retry.
pub async fn deliver_file(bot: &Bot, chat_id: ChatId, pool: &DbPool, file_id: &str) -> AppResult<DeliveryOutcome> {
    let file = {
        let conn = get_connection(pool)?;
        files::get_file(&conn, file_id)?
    };

    let Some(file) = file else {
        log::info!("Chat {} requested unknown file {}", chat_id, file_id);
        bot.send_message(chat_id, FILE_NOT_FOUND).await?;
        return Ok(DeliveryOutcome::NotFound);
    };

    let Some(handle) = file.telegram_file_id.clone().filter(|h| !h.is_empty()) else {
        log::error!("File {} ({}) has no content handle", file.id, file.name);
        bot.send_message(chat_id, SEND_FAILED).await?;
        return Ok(DeliveryOutcome::Failed);
    };

    match bot
        .send_document(chat_id, InputFile::file_id(FileId(handle)))
        .caption(format!("📄 {}", file.name))
        .await
    {
        Ok(_) => {
            log::info!("Delivered file {} to chat {}", file.id, chat_id);
            Ok(DeliveryOutcome::Sent)
        }
        Err(e) => {
            log::error!("Error sending file {} to chat {}: {}", file.id, chat_id, e);
            bot.send_message(chat_id, SEND_FAILED).await?;
            Ok(DeliveryOutcome::Failed)
        }
    }
}

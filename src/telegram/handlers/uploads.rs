//! Document intake from the admin

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::storage::get_connection;
use crate::storage::pending::{insert_pending, NewPendingFile};
use crate::telegram::Bot;

/// File name used when Telegram does not report one
const DEFAULT_DOCUMENT_NAME: &str = "document";

pub(super) fn upload_ack_text(name: &str) -> String {
    format!(
        "✅ File '{}' received!\nUse the admin panel to assign it to a category.",
        name
    )
}

/// Stores an admin's document as a pending file. Documents from anyone else are ignored.
pub(super) async fn handle_document_upload(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(doc) = msg.document() else {
        return Ok(());
    };
    if !deps.is_admin(msg.from.as_ref()) {
        log::debug!("Ignoring document from non-admin chat {}", msg.chat.id);
        return Ok(());
    }

    let name = doc
        .file_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());
    let mime_type = doc.mime_type.as_ref().map(|m| m.to_string());

    let pending_id = {
        let conn = get_connection(&deps.db_pool)?;
        insert_pending(
            &conn,
            &NewPendingFile {
                telegram_file_id: &doc.file.id.0,
                name: &name,
                size: Some(doc.file.size as i64),
                mime_type: mime_type.as_deref(),
            },
        )?
    };
    log::info!("Stored pending upload {} ('{}')", pending_id, name);

    bot.send_message(msg.chat.id, upload_ack_text(&name)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_ack_text() {
        assert_eq!(
            upload_ack_text("demo.apk"),
            "✅ File 'demo.apk' received!\nUse the admin panel to assign it to a category."
        );
    }
}

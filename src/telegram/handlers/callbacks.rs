//! Inline keyboard navigation

use teloxide::prelude::*;
use teloxide::types::MessageId;
use teloxide::{ApiError, RequestError};

use super::types::{HandlerDeps, HandlerError};
use crate::catalog::navigator::{navigate, Menu, Navigation};
use crate::catalog::CallbackAction;
use crate::storage::get_connection;
use crate::telegram::delivery::deliver_file;
use crate::telegram::keyboard::to_inline_keyboard;
use crate::telegram::Bot;

/// Replaces the text and keyboard of the message that carried the button.
async fn edit_menu(bot: &Bot, chat_id: ChatId, message_id: MessageId, menu: &Menu) -> Result<(), RequestError> {
    let result = bot
        .edit_message_text(chat_id, message_id, menu.text.clone())
        .reply_markup(to_inline_keyboard(menu))
        .await;

    match result {
        Ok(_) => Ok(()),
        // Pressing the button for the screen already shown
        Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e),
    }
}

pub(super) async fn handle_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        log::warn!("Failed to answer callback query: {}", e);
    }

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(action) = CallbackAction::parse(data) else {
        log::debug!("Ignoring unknown callback data: {}", data);
        return Ok(());
    };
    let Some((chat_id, message_id)) = q.message.as_ref().map(|m| (m.chat().id, m.id())) else {
        log::debug!("Callback {} has no message to edit", data);
        return Ok(());
    };

    let navigation = {
        let conn = get_connection(&deps.db_pool)?;
        navigate(&conn, &action, deps.bot_username.as_deref())?
    };

    match navigation {
        Navigation::Show(menu) => edit_menu(&bot, chat_id, message_id, &menu).await?,
        Navigation::AwaitSearch(menu) => {
            deps.search_sessions.begin(chat_id);
            edit_menu(&bot, chat_id, message_id, &menu).await?;
        }
        Navigation::Deliver(file_id) => {
            deliver_file(&bot, chat_id, &deps.db_pool, &file_id).await?;
        }
    }
    Ok(())
}

//! `/start` handling: registration, deep-link delivery, root menu

use teloxide::types::Message;

use super::types::{register_subscriber, send_menu, HandlerDeps, HandlerError};
use crate::catalog::callback::parse_start_payload;
use crate::catalog::navigator::load_root_menu;
use crate::storage::get_connection;
use crate::telegram::delivery::deliver_file;
use crate::telegram::Bot;

/// Handle /start command
///
/// Registers the sender, then either delivers `file_<id>` from the payload
/// or shows the root category menu. Any pending search is abandoned.
pub(super) async fn handle_start_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    payload: &str,
) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    if let Some(user) = msg.from.as_ref() {
        log::info!(
            "User {} ({}) started the bot",
            user.id,
            user.username.as_deref().unwrap_or("no username")
        );
        register_subscriber(&deps.db_pool, user);
    }
    deps.search_sessions.take(chat_id);

    if let Some(file_id) = parse_start_payload(payload) {
        deliver_file(bot, chat_id, &deps.db_pool, &file_id).await?;
        return Ok(());
    }

    let menu = {
        let conn = get_connection(&deps.db_pool)?;
        load_root_menu(&conn)?
    };
    send_menu(bot, chat_id, &menu).await?;
    log::debug!("Sent main menu to chat {}", chat_id);
    Ok(())
}

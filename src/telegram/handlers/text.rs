//! Plain text: search queries and the help notice

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{send_menu, HandlerDeps, HandlerError};
use crate::catalog::navigator::{help_menu, Menu};
use crate::catalog::search::{search_failed_menu, search_menu, SEARCH_FAILED};
use crate::storage::get_connection;
use crate::telegram::Bot;

pub(super) async fn handle_text_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let menu = if deps.search_sessions.take(chat_id) {
        log::info!("Chat {} searching for: {}", chat_id, text.trim());
        search_screen(deps, text)
    } else {
        help_menu()
    };

    if let Err(e) = send_menu(bot, chat_id, &menu).await {
        log::error!("Failed to send screen to chat {}: {}", chat_id, e);
        bot.send_message(chat_id, SEARCH_FAILED).await?;
    }
    Ok(())
}

/// Results for `query`, or a retry notice when the store fails.
fn search_screen(deps: &HandlerDeps, query: &str) -> Menu {
    let result = get_connection(&deps.db_pool).and_then(|conn| search_menu(&conn, query));
    match result {
        Ok(menu) => menu,
        Err(e) => {
            log::error!("Search for '{}' failed: {}", query.trim(), e);
            search_failed_menu()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::navigator::NEW_SEARCH_LABEL;
    use crate::storage::create_pool;
    use crate::telegram::handlers::SearchSessions;
    use std::sync::Arc;

    #[test]
    fn test_search_screen_offers_retry_when_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(dir.path().join("bot.db").to_str().unwrap()).unwrap();
        let deps = HandlerDeps::new(Arc::new(pool), 1, None, Arc::new(SearchSessions::default()));

        let menu = search_screen(&deps, "nothing here");
        assert!(menu.text.starts_with("🔍 No files found"));
        assert!(menu.labels().contains(&NEW_SEARCH_LABEL));
    }
}

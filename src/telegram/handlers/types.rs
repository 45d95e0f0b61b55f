//! Handler types, dependencies, and subscriber registration

use std::sync::Arc;

use dashmap::DashSet;
use teloxide::types::{ChatId, User};

use crate::catalog::navigator::Menu;
use crate::storage::subscribers::{upsert_subscriber, SubscriberUpsert};
use crate::storage::{get_connection, DbPool};
use crate::telegram::keyboard::to_inline_keyboard;
use crate::telegram::Bot;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Chats whose next plain-text message is a search query.
///
/// Held in memory only; a restart forgets pending searches.
#[derive(Debug, Default)]
pub struct SearchSessions {
    waiting: DashSet<i64>,
}

impl SearchSessions {
    pub fn begin(&self, chat_id: ChatId) {
        self.waiting.insert(chat_id.0);
    }

    /// Consumes the search mode for `chat_id`, returning whether it was set.
    pub fn take(&self, chat_id: ChatId) -> bool {
        self.waiting.remove(&chat_id.0).is_some()
    }

    #[cfg(test)]
    fn is_waiting(&self, chat_id: ChatId) -> bool {
        self.waiting.contains(&chat_id.0)
    }
}

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    /// The only Telegram user whose documents are accepted as uploads
    pub admin_id: i64,
    pub bot_username: Option<String>,
    pub search_sessions: Arc<SearchSessions>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(
        db_pool: Arc<DbPool>,
        admin_id: i64,
        bot_username: Option<String>,
        search_sessions: Arc<SearchSessions>,
    ) -> Self {
        Self {
            db_pool,
            admin_id,
            bot_username,
            search_sessions,
        }
    }

    pub fn is_admin(&self, user: Option<&User>) -> bool {
        user.and_then(|u| i64::try_from(u.id.0).ok()) == Some(self.admin_id)
    }
}

/// Registers the sender as an active subscriber.
///
/// Failures are logged and swallowed so the menu still shows.
pub fn register_subscriber(db_pool: &DbPool, user: &User) -> Option<SubscriberUpsert> {
    let Ok(user_id) = i64::try_from(user.id.0) else {
        log::warn!("Telegram user id {} does not fit in i64", user.id.0);
        return None;
    };

    let result = get_connection(db_pool)
        .and_then(|conn| upsert_subscriber(&conn, user_id, Some(user.first_name.as_str()), user.username.as_deref()));

    match result {
        Ok(outcome) => {
            match outcome {
                SubscriberUpsert::Created => log::info!("Added new subscriber: {}", user_id),
                SubscriberUpsert::Reactivated => log::info!("Reactivated subscriber: {}", user_id),
                SubscriberUpsert::Existing => {}
            }
            Some(outcome)
        }
        Err(e) => {
            log::error!("Error adding subscriber {}: {}", user_id, e);
            None
        }
    }
}

/// Sends `menu` as a new message, attaching its keyboard when it has buttons.
pub(super) async fn send_menu(bot: &Bot, chat_id: ChatId, menu: &Menu) -> Result<(), teloxide::RequestError> {
    use teloxide::prelude::*;

    let request = bot.send_message(chat_id, menu.text.clone());
    if menu.rows.is_empty() {
        request.await?;
    } else {
        request.reply_markup(to_inline_keyboard(menu)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_sessions_are_one_shot() {
        let sessions = SearchSessions::default();
        let chat = ChatId(10);
        assert!(!sessions.take(chat));
        sessions.begin(chat);
        assert!(sessions.is_waiting(chat));
        assert!(sessions.take(chat));
        assert!(!sessions.take(chat));
        assert!(!sessions.is_waiting(ChatId(11)));
    }
}

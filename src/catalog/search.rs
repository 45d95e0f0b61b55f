//! File-name search screens.

use rusqlite::Connection;

use crate::catalog::callback::CallbackAction;
use crate::catalog::navigator::{Menu, MenuButton, BACK_TO_MAIN_LABEL, NEW_SEARCH_LABEL};
use crate::core::config;
use crate::core::error::AppResult;
use crate::core::utils::{format_file_size, truncate_chars};
use crate::storage::files::{self, SearchHit};

/// Budget for the result text; Telegram rejects messages over 4096 characters
pub const MAX_TEXT_CHARS: usize = 4000;
/// File and category names longer than this are shortened on the screen
const MAX_NAME_CHARS: usize = 100;
/// Echoed query length
const MAX_QUERY_CHARS: usize = 64;

pub const SEARCH_FAILED: &str = "Sorry, the search results could not be shown. Please try again.";

/// Runs a search capped at the configured result limit.
pub fn search(conn: &Connection, query: &str) -> AppResult<Vec<SearchHit>> {
    files::search_files(conn, query, config::search::RESULT_LIMIT)
}

/// Result screen for `query`.
///
/// Names are shortened and entries that would push the text past
/// [`MAX_TEXT_CHARS`] are summarized in a trailing line; every hit still
/// gets its button.
pub fn results_menu(query: &str, hits: &[SearchHit]) -> Menu {
    let query = truncate_chars(query.trim(), MAX_QUERY_CHARS);
    if hits.is_empty() {
        return Menu::new(format!(
            "🔍 No files found for '{}'\n\nTry different keywords or browse categories.",
            query
        ))
        .with_button(MenuButton::callback(NEW_SEARCH_LABEL, CallbackAction::SearchFiles))
        .with_button(MenuButton::callback(BACK_TO_MAIN_LABEL, CallbackAction::BackMain));
    }

    let mut text = format!("🔍 Search Results for '{}'\n\nFound {} file(s):\n\n", query, hits.len());
    let mut used = text.chars().count();
    let mut omitted = 0usize;
    let mut menu = Menu::new(String::new());
    for hit in hits {
        let name = truncate_chars(&hit.name, MAX_NAME_CHARS);
        let size = match hit.size {
            Some(s) if s > 0 => format!(" ({})", format_file_size(hit.size)),
            _ => String::new(),
        };
        let entry = format!(
            "📄 {}{}\n📂 Category: {}\n\n",
            name,
            size,
            truncate_chars(&hit.category_name, MAX_NAME_CHARS)
        );
        let entry_chars = entry.chars().count();
        // Leave room for the "more" line
        if omitted == 0 && used + entry_chars + 64 <= MAX_TEXT_CHARS {
            text.push_str(&entry);
            used += entry_chars;
        } else {
            omitted += 1;
        }
        menu.rows.push(MenuButton::callback(
            format!("📄 {}", name),
            CallbackAction::File(hit.id.clone()),
        ));
    }
    if omitted > 0 {
        text.push_str(&format!("…and {} more, see the buttons below.", omitted));
    }
    menu.text = text.trim_end().to_string();

    menu.with_button(MenuButton::callback(NEW_SEARCH_LABEL, CallbackAction::SearchFiles))
        .with_button(MenuButton::callback(BACK_TO_MAIN_LABEL, CallbackAction::BackMain))
}

/// Shown when results could not be produced or delivered.
pub fn search_failed_menu() -> Menu {
    Menu::new(SEARCH_FAILED)
        .with_button(MenuButton::callback(NEW_SEARCH_LABEL, CallbackAction::SearchFiles))
        .with_button(MenuButton::callback(BACK_TO_MAIN_LABEL, CallbackAction::BackMain))
}

/// Searches and renders in one step.
pub fn search_menu(conn: &Connection, query: &str) -> AppResult<Menu> {
    let hits = search(conn, query)?;
    log::info!("Search for '{}' matched {} file(s)", query.trim(), hits.len());
    Ok(results_menu(query, &hits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::navigator::ButtonTarget;
    use crate::storage::categories::insert_category;
    use crate::storage::db::test_connection;
    use crate::storage::files::{insert_file, NewFile};

    fn hit(id: &str, name: &str, size: Option<i64>) -> SearchHit {
        SearchHit {
            id: id.into(),
            name: name.into(),
            category_name: "Apps".into(),
            size,
        }
    }

    #[test]
    fn test_no_results_screen() {
        let menu = results_menu("zzz", &[]);
        assert!(menu.text.starts_with("🔍 No files found for 'zzz'"));
        assert_eq!(menu.labels(), vec![NEW_SEARCH_LABEL, BACK_TO_MAIN_LABEL]);
        assert_eq!(menu.rows[0].target, ButtonTarget::Callback(CallbackAction::SearchFiles));
    }

    #[test]
    fn test_long_results_fit_in_one_message() {
        let long_name = "x".repeat(200);
        let hits: Vec<SearchHit> = (0..config::search::RESULT_LIMIT)
            .map(|i| SearchHit {
                id: i.to_string(),
                name: format!("{}-{}", long_name, i),
                category_name: "c".repeat(300),
                size: Some(1024 * 1024),
            })
            .collect();

        let menu = results_menu(&"q".repeat(500), &hits);
        assert!(menu.text.chars().count() <= MAX_TEXT_CHARS);
        assert!(menu.text.starts_with(&format!("🔍 Search Results for '{}…'", "q".repeat(63))));
        assert!(menu.text.contains("Found 20 file(s)"));
        assert!(menu.text.ends_with("more, see the buttons below."));
        // Every hit is still reachable
        assert_eq!(menu.rows.len(), config::search::RESULT_LIMIT + 2);
        assert!(menu.rows.iter().all(|b| b.label.chars().count() <= MAX_NAME_CHARS + 2));
    }

    #[test]
    fn test_failure_notice_offers_retry() {
        let menu = search_failed_menu();
        assert_eq!(menu.text, SEARCH_FAILED);
        assert_eq!(menu.labels(), vec![NEW_SEARCH_LABEL, BACK_TO_MAIN_LABEL]);
    }

    #[test]
    fn test_long_query_without_results_is_shortened() {
        let menu = results_menu(&"z".repeat(5000), &[]);
        assert!(menu.text.chars().count() < 200);
    }

    #[test]
    fn test_results_screen() {
        let menu = results_menu(" demo ", &[hit("1", "demo.apk", Some(2048)), hit("2", "demo2.apk", None)]);
        assert!(menu.text.starts_with("🔍 Search Results for 'demo'\n\nFound 2 file(s):"));
        assert!(menu.text.contains("📄 demo.apk (2.0 KB)\n📂 Category: Apps"));
        assert!(menu.text.contains("📄 demo2.apk\n📂 Category: Apps"));
        assert_eq!(
            menu.labels(),
            vec!["📄 demo.apk", "📄 demo2.apk", NEW_SEARCH_LABEL, BACK_TO_MAIN_LABEL]
        );
    }

    #[test]
    fn test_search_never_exceeds_limit() {
        let conn = test_connection();
        let apps = insert_category(&conn, "Apps", None, None).unwrap();
        for i in 0..30 {
            let name = format!("tool-{}.zip", i);
            insert_file(
                &conn,
                &NewFile {
                    name: &name,
                    category_id: &apps,
                    telegram_file_id: None,
                    description: None,
                    size: None,
                    mime_type: None,
                },
            )
            .unwrap();
        }
        assert_eq!(search(&conn, "tool").unwrap().len(), config::search::RESULT_LIMIT);
        assert_eq!(search(&conn, "tool-7.").unwrap().len(), 1);
        assert!(search(&conn, "absent").unwrap().is_empty());
    }
}

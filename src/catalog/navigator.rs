//! Builds the bot's menu screens from store data.
//!
//! Screens are plain values (`Menu`) so they can be rendered into any
//! keyboard type and asserted on without a Telegram connection.

use rusqlite::Connection;

use crate::catalog::callback::{deep_link, CallbackAction};
use crate::core::error::AppResult;
use crate::core::utils::format_file_size;
use crate::storage::categories::{self, Category};
use crate::storage::files::{self, FileEntry};

pub const WELCOME_TEXT: &str = "🤖 Welcome to File Distribution Bot!\n\nSelect a category to browse files:";
pub const EMPTY_CATALOG_TEXT: &str =
    "🤖 Welcome to File Distribution Bot!\n\nNo categories available yet. Please contact the admin to add categories.";
pub const CATEGORY_NOT_FOUND: &str = "Category not found.";
pub const FILE_NOT_FOUND: &str = "File not found.";
pub const SEND_FAILED: &str = "Sorry, there was an error sending the file.";
pub const HELP_TEXT: &str = "Use the buttons below to navigate, or send /start to see the main menu.";
pub const SEARCH_PROMPT_TEXT: &str =
    "🔍 Search Files\n\nType the name of the file you're looking for.\nI'll search through all available files.";

pub const BACK_LABEL: &str = "⬅️ Back";
pub const BACK_TO_MAIN_LABEL: &str = "⬅️ Back to Main Menu";
pub const SEARCH_LABEL: &str = "🔍 Search Files";
pub const NEW_SEARCH_LABEL: &str = "🔍 New Search";
pub const DOWNLOAD_LABEL: &str = "📥 Download";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonTarget {
    Callback(CallbackAction),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub target: ButtonTarget,
}

impl MenuButton {
    pub fn callback(label: impl Into<String>, action: CallbackAction) -> Self {
        MenuButton {
            label: label.into(),
            target: ButtonTarget::Callback(action),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        MenuButton {
            label: label.into(),
            target: ButtonTarget::Url(url.into()),
        }
    }
}

/// A screen: message text plus one button per keyboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub text: String,
    pub rows: Vec<MenuButton>,
}

impl Menu {
    pub fn new(text: impl Into<String>) -> Self {
        Menu {
            text: text.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_button(mut self, button: MenuButton) -> Self {
        self.rows.push(button);
        self
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|b| b.label.as_str()).collect()
    }
}

/// What the bot should do in response to a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Replace the current message with this screen
    Show(Menu),
    /// Show the search prompt and wait for the next text message
    AwaitSearch(Menu),
    /// Send the document with this file id
    Deliver(String),
}

pub fn root_menu(roots: &[Category]) -> Menu {
    if roots.is_empty() {
        return Menu::new(EMPTY_CATALOG_TEXT);
    }

    let mut menu = Menu::new(WELCOME_TEXT);
    for category in roots {
        menu.rows.push(MenuButton::callback(
            category.name.clone(),
            CallbackAction::Category(category.id.clone()),
        ));
    }
    menu.with_button(MenuButton::callback(SEARCH_LABEL, CallbackAction::SearchFiles))
}

/// Subcategories first, then files, then a Back button.
pub fn category_menu(category: &Category, subcategories: &[Category], files: &[FileEntry]) -> Menu {
    let mut menu = Menu::new(format!("📁 {}\n\nSelect a file or subcategory:", category.name));

    for sub in subcategories {
        menu.rows.push(MenuButton::callback(
            format!("📁 {}", sub.name),
            CallbackAction::Category(sub.id.clone()),
        ));
    }
    for file in files {
        menu.rows.push(MenuButton::callback(
            format!("📄 {}", file.name),
            CallbackAction::File(file.id.clone()),
        ));
    }

    let back = match &category.parent_id {
        None => CallbackAction::BackMain,
        Some(parent) => CallbackAction::BackCategory(Some(parent.clone())),
    };
    menu.with_button(MenuButton::callback(BACK_LABEL, back))
}

/// File details with a delivery action when the file has content.
///
/// With a known bot username the action is a deep link, otherwise a
/// `download_<id>` callback.
pub fn file_card(file: &FileEntry, bot_username: Option<&str>) -> Menu {
    let mut text = format!("📄 {}\n\n", file.name);
    if let Some(description) = file.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(&format!("Description: {}\n\n", description));
    }
    if file.size.is_some_and(|s| s > 0) {
        text.push_str(&format!("Size: {}\n", format_file_size(file.size)));
    }

    let mut menu = Menu::new(text.trim_end());
    if file.is_deliverable() {
        let button = match bot_username.filter(|u| !u.is_empty()) {
            Some(username) => MenuButton::url(DOWNLOAD_LABEL, deep_link(username, &file.id)),
            None => MenuButton::callback(DOWNLOAD_LABEL, CallbackAction::Download(file.id.clone())),
        };
        menu.rows.push(button);
    }
    menu.with_button(MenuButton::callback(
        BACK_LABEL,
        CallbackAction::Category(file.category_id.clone()),
    ))
}

/// A bare notice with no buttons.
pub fn not_found(text: &str) -> Menu {
    Menu::new(text)
}

pub fn help_menu() -> Menu {
    Menu::new(HELP_TEXT).with_button(MenuButton::callback(BACK_TO_MAIN_LABEL, CallbackAction::BackMain))
}

pub fn search_prompt() -> Menu {
    Menu::new(SEARCH_PROMPT_TEXT).with_button(MenuButton::callback(BACK_TO_MAIN_LABEL, CallbackAction::BackMain))
}

pub fn load_root_menu(conn: &Connection) -> AppResult<Menu> {
    Ok(root_menu(&categories::list_root_categories(conn)?))
}

pub fn load_category_menu(conn: &Connection, category_id: &str) -> AppResult<Menu> {
    let Some(category) = categories::get_category(conn, category_id)? else {
        return Ok(not_found(CATEGORY_NOT_FOUND));
    };
    let subcategories = categories::list_subcategories(conn, category_id)?;
    let files = files::list_files_in_category(conn, category_id)?;
    Ok(category_menu(&category, &subcategories, &files))
}

pub fn load_file_card(conn: &Connection, file_id: &str, bot_username: Option<&str>) -> AppResult<Menu> {
    match files::get_file(conn, file_id)? {
        Some(file) => Ok(file_card(&file, bot_username)),
        None => Ok(not_found(FILE_NOT_FOUND)),
    }
}

/// Resolves a callback into the next screen.
pub fn navigate(conn: &Connection, action: &CallbackAction, bot_username: Option<&str>) -> AppResult<Navigation> {
    let screen = match action {
        CallbackAction::Category(id) | CallbackAction::BackCategory(Some(id)) => load_category_menu(conn, id)?,
        CallbackAction::File(id) => load_file_card(conn, id, bot_username)?,
        CallbackAction::BackMain | CallbackAction::BackCategory(None) => load_root_menu(conn)?,
        CallbackAction::SearchFiles => return Ok(Navigation::AwaitSearch(search_prompt())),
        CallbackAction::Download(id) => return Ok(Navigation::Deliver(id.clone())),
    };
    Ok(Navigation::Show(screen))
}

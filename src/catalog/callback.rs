//! Inline-keyboard callback payloads and `/start` deep-link arguments.

/// Action carried by an inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// `category_<id>`
    Category(String),
    /// `file_<id>`
    File(String),
    /// `back_main`
    BackMain,
    /// `back_category_<id>`; `None` encodes a return to the root menu
    BackCategory(Option<String>),
    /// `search_files`
    SearchFiles,
    /// `download_<id>`, used when no deep link can be built
    Download(String),
}

const NONE_MARKER: &str = "None";

fn non_empty(id: &str) -> Option<String> {
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

impl CallbackAction {
    /// Parses raw callback data. Unknown payloads yield `None`.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "back_main" => return Some(CallbackAction::BackMain),
            "search_files" => return Some(CallbackAction::SearchFiles),
            _ => {}
        }

        if let Some(rest) = data.strip_prefix("back_category_") {
            return match rest {
                "" | NONE_MARKER => Some(CallbackAction::BackCategory(None)),
                id => Some(CallbackAction::BackCategory(Some(id.to_string()))),
            };
        }
        if let Some(rest) = data.strip_prefix("category_") {
            return non_empty(rest).map(CallbackAction::Category);
        }
        if let Some(rest) = data.strip_prefix("file_") {
            return non_empty(rest).map(CallbackAction::File);
        }
        if let Some(rest) = data.strip_prefix("download_") {
            return non_empty(rest).map(CallbackAction::Download);
        }
        None
    }

    pub fn to_data(&self) -> String {
        match self {
            CallbackAction::Category(id) => format!("category_{}", id),
            CallbackAction::File(id) => format!("file_{}", id),
            CallbackAction::BackMain => "back_main".to_string(),
            CallbackAction::BackCategory(Some(id)) => format!("back_category_{}", id),
            CallbackAction::BackCategory(None) => format!("back_category_{}", NONE_MARKER),
            CallbackAction::SearchFiles => "search_files".to_string(),
            CallbackAction::Download(id) => format!("download_{}", id),
        }
    }
}

/// Extracts the file id from a `/start file_<id>` payload.
pub fn parse_start_payload(payload: &str) -> Option<String> {
    payload
        .split_whitespace()
        .next()
        .and_then(|arg| arg.strip_prefix("file_"))
        .and_then(non_empty)
}

/// Deep link that makes Telegram open the bot with `/start file_<id>`.
pub fn deep_link(bot_username: &str, file_id: &str) -> String {
    format!("https://t.me/{}?start=file_{}", bot_username.trim_start_matches('@'), file_id)
}

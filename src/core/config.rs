use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Reads an environment variable, treating blank values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Bot token
/// Read from TELEGRAM_BOT_TOKEN, falling back to BOT_TOKEN
/// Empty string when neither is set (the bot refuses to start)
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    non_empty_var("TELEGRAM_BOT_TOKEN")
        .or_else(|| non_empty_var("BOT_TOKEN"))
        .unwrap_or_default()
});

/// Optional custom Bot API server URL
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("BOT_API_URL"));

/// Single admin identity
/// Read from ADMIN_ID environment variable
/// Used both as the web panel login and as the Telegram user allowed to upload
pub static ADMIN_ID: Lazy<String> = Lazy::new(|| non_empty_var("ADMIN_ID").unwrap_or_default());

/// Optional storage channel identifier
/// Read from STORAGE_CHANNEL_ID environment variable
pub static STORAGE_CHANNEL_ID: Lazy<Option<String>> = Lazy::new(|| non_empty_var("STORAGE_CHANNEL_ID"));

/// Development fallback for SESSION_SECRET
pub const DEV_SESSION_SECRET: &str = "dev-secret-key-change-in-production";

/// Secret used to sign the admin session cookie
/// Read from SESSION_SECRET environment variable
pub static SESSION_SECRET: Lazy<String> =
    Lazy::new(|| non_empty_var("SESSION_SECRET").unwrap_or_else(|| DEV_SESSION_SECRET.to_string()));

/// Database connection string
/// Read from DATABASE_URL environment variable
/// When unset the embedded SQLite file `bot.db` is used
pub static DATABASE_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("DATABASE_URL"));

/// Default SQLite file when DATABASE_URL is not set
pub const DEFAULT_DATABASE_PATH: &str = "bot.db";

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: fileshelf.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| non_empty_var("LOG_FILE_PATH").unwrap_or_else(|| "fileshelf.log".to_string()));

/// Log level (error, warn, info, debug, trace)
/// Read from LOG_LEVEL environment variable
/// Default: info
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| non_empty_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()));

/// Whether SESSION_SECRET was provided explicitly
pub fn session_secret_configured() -> bool {
    non_empty_var("SESSION_SECRET").is_some()
}

/// Parses the configured admin id as a Telegram user id.
///
/// Returns `None` when ADMIN_ID is missing, not numeric, or `0`.
pub fn admin_user_id() -> Option<i64> {
    parse_admin_user_id(&ADMIN_ID)
}

pub fn parse_admin_user_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id != 0)
}

/// Resolves the SQLite file path from DATABASE_URL.
///
/// # Errors
/// Returns `AppError::Config` when DATABASE_URL names a non-SQLite backend.
pub fn database_path() -> AppResult<String> {
    match DATABASE_URL.as_deref() {
        Some(url) => sqlite_path_from_url(url),
        None => Ok(DEFAULT_DATABASE_PATH.to_string()),
    }
}

/// Accepts `sqlite://path`, `sqlite:path` or a plain file path.
pub fn sqlite_path_from_url(url: &str) -> AppResult<String> {
    let url = url.trim();
    let path = if let Some(rest) = url.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = url.strip_prefix("sqlite:") {
        rest
    } else if url.contains("://") {
        return Err(AppError::Config(format!(
            "unsupported DATABASE_URL scheme (only sqlite is supported): {}",
            url.split("://").next().unwrap_or_default()
        )));
    } else {
        url
    };

    if path.is_empty() {
        return Err(AppError::Config("DATABASE_URL has an empty sqlite path".to_string()));
    }
    Ok(path.to_string())
}

/// Web panel configuration
pub mod web {
    use super::non_empty_var;
    use once_cell::sync::Lazy;

    /// Bind address
    /// Read from WEB_HOST environment variable
    /// Default: 0.0.0.0
    pub static HOST: Lazy<String> = Lazy::new(|| non_empty_var("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()));

    /// Bind port
    /// Read from WEB_PORT (or PORT) environment variable
    /// Default: 5000
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        non_empty_var("WEB_PORT")
            .or_else(|| non_empty_var("PORT"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000)
    });

    /// Name of the signed session cookie
    pub const SESSION_COOKIE: &str = "fileshelf_session";
}

/// Bot listener configuration
pub mod bot {
    use super::Duration;

    /// Delay before the supervisor restarts a crashed bot listener (in seconds)
    pub const RESTART_DELAY_SECS: u64 = 5;

    pub fn restart_delay() -> Duration {
        Duration::from_secs(RESTART_DELAY_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Long polling uses up to 10 s of server-side wait on top of this budget
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Search configuration
pub mod search {
    /// Maximum number of files returned by a single search
    pub const RESULT_LIMIT: usize = 20;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_path_from_url_variants() {
        assert_eq!(sqlite_path_from_url("sqlite://data/bot.db").unwrap(), "data/bot.db");
        assert_eq!(sqlite_path_from_url("sqlite:bot.db").unwrap(), "bot.db");
        assert_eq!(sqlite_path_from_url("/var/lib/fileshelf.db").unwrap(), "/var/lib/fileshelf.db");
    }

    #[test]
    fn test_sqlite_path_from_url_rejects_other_backends() {
        let err = sqlite_path_from_url("postgres://user@localhost/db").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(sqlite_path_from_url("sqlite://").is_err());
    }

    #[test]
    fn test_parse_admin_user_id() {
        assert_eq!(parse_admin_user_id("123456"), Some(123456));
        assert_eq!(parse_admin_user_id(" 42 "), Some(42));
        assert_eq!(parse_admin_user_id("0"), None);
        assert_eq!(parse_admin_user_id(""), None);
        assert_eq!(parse_admin_user_id("admin"), None);
    }
}

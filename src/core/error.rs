use thiserror::Error;

/// Centralized error types for the application
///
/// Storage, Telegram and web layers all convert into this enum so that
/// handlers can decide in one place what the user gets to see.
///
/// # Example
///
/// ```no_run
/// use fileshelf::core::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema migration failures
    #[error("Migration error: {0}")]
    Migration(#[from] anyhow::Error),

    /// Missing or malformed required input (name, category, message text)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Stale or unknown identifier
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Missing or invalid configuration at startup
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Message that is safe to show to an end user or admin.
    ///
    /// Validation and not-found errors carry their own wording; everything
    /// else collapses into a generic notice and is expected to be logged.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(what) => format!("{} not found!", what),
            _ => "Something went wrong, please try again.".to_string(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

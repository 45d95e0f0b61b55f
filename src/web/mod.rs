//! Admin web panel.
//!
//! Session-gated HTML pages over the catalog, the pending uploads and the
//! broadcast history, plus a small JSON surface (`/api/subscribers`,
//! `/health`). Runs on WEB_HOST:WEB_PORT (default 0.0.0.0:5000) next to
//! the bot listener and shares its database pool.

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod categories;
pub mod dashboard;
pub mod files;
pub mod pages;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::broadcast::BroadcastSender;
use crate::core::config;
use crate::core::error::AppResult;
use crate::storage::db::DbPool;

pub use auth::{AdminSession, Flash, FlashLevel, SessionStore};

/// Which optional settings were supplied, shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigStatus {
    pub bot_token: bool,
    pub admin_id: bool,
    pub storage_channel_id: bool,
    pub session_secret: bool,
}

impl ConfigStatus {
    pub fn from_env() -> Self {
        Self {
            bot_token: !config::BOT_TOKEN.is_empty(),
            admin_id: !config::ADMIN_ID.is_empty(),
            storage_channel_id: config::STORAGE_CHANNEL_ID.is_some(),
            session_secret: config::session_secret_configured(),
        }
    }
}

/// Shared state for the web panel.
#[derive(Clone)]
pub struct WebState {
    pub db_pool: Arc<DbPool>,
    pub sessions: SessionStore,
    /// Cookie signing key
    pub secret: Arc<String>,
    /// Value an admin must type on the login form
    pub admin_id: Arc<String>,
    /// `None` when no bot token is configured; broadcasts are refused
    pub broadcaster: Option<Arc<dyn BroadcastSender>>,
    pub config_status: ConfigStatus,
}

impl WebState {
    pub fn new(
        db_pool: Arc<DbPool>,
        secret: impl Into<String>,
        admin_id: impl Into<String>,
        broadcaster: Option<Arc<dyn BroadcastSender>>,
    ) -> Self {
        Self {
            db_pool,
            sessions: SessionStore::new(),
            secret: Arc::new(secret.into()),
            admin_id: Arc::new(admin_id.into()),
            broadcaster,
            config_status: ConfigStatus::default(),
        }
    }

    pub fn with_config_status(mut self, status: ConfigStatus) -> Self {
        self.config_status = status;
        self
    }
}

/// Turns an admin operation result into the flash shown after the redirect.
///
/// Validation and not-found errors carry their own wording; anything else
/// is logged and reported generically.
pub(crate) fn flash_result(result: AppResult<String>) -> Flash {
    match result {
        Ok(message) => Flash::success(message),
        Err(e) => {
            if !matches!(e, crate::core::AppError::Validation(_) | crate::core::AppError::NotFound(_)) {
                log::error!("Admin operation failed: {}", e);
            }
            Flash::error(e.user_message())
        }
    }
}

/// Builds the panel's router.
pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/categories", get(categories::list))
        .route("/categories/add", post(categories::add))
        .route("/categories/{id}/edit", post(categories::edit))
        .route("/categories/{id}/delete", post(categories::delete))
        .route("/files", get(files::list))
        .route("/files/add", post(files::add))
        .route("/files/add_pending/{id}", post(files::add_pending))
        .route("/files/{id}/edit", post(files::edit))
        .route("/files/{id}/delete", post(files::delete))
        .route("/files/pending/{id}/delete", post(files::delete_pending))
        .route("/broadcast", get(broadcast::page))
        .route("/broadcast/send", post(broadcast::send))
        .route("/api/subscribers", get(api::subscribers))
        .route("/health", get(api::health))
        .with_state(state)
}

/// Serves the panel until Ctrl+C.
pub async fn run_web_server(state: WebState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", *config::web::HOST, *config::web::PORT).parse()?;
    let app = router(state);

    log::info!("Starting web panel on http://{}", addr);
    log::info!("  /                - Dashboard");
    log::info!("  /api/subscribers - Active subscribers (JSON)");
    log::info!("  /health          - Health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
            log::info!("Web panel shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AppError;

    #[test]
    fn test_flash_result_maps_outcomes() {
        let ok = flash_result(Ok("Category \"Apps\" added successfully!".into()));
        assert_eq!(ok.level, FlashLevel::Success);

        let err = flash_result(Err(AppError::Validation("Category name is required!".into())));
        assert_eq!(err.level, FlashLevel::Error);
        assert_eq!(err.message, "Category name is required!");

        let missing = flash_result(Err(AppError::NotFound("File")));
        assert_eq!(missing.message, "File not found!");
    }
}

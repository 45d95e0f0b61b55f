use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::catalog::admin;
use crate::core::error::AppResult;
use crate::storage::{get_connection, pending};
use crate::web::auth::AdminSession;
use crate::web::{pages, WebState};

/// GET / - counts, pending uploads and configuration status.
pub async fn dashboard(State(state): State<WebState>, session: AdminSession) -> Response {
    let flashes = session.take_flashes(&state);
    match load(&state) {
        Ok((stats, uploads)) => Html(pages::dashboard_page(&flashes, &stats, &uploads, &state.config_status)).into_response(),
        Err(e) => {
            log::error!("Failed to load dashboard: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.user_message())).into_response()
        }
    }
}

fn load(state: &WebState) -> AppResult<(admin::DashboardStats, Vec<pending::PendingFile>)> {
    let conn = get_connection(&state.db_pool)?;
    let stats = admin::dashboard_stats(&conn)?;
    let uploads = pending::list_pending(&conn)?;
    Ok((stats, uploads))
}

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::broadcast::send_broadcast;
use crate::core::error::{AppError, AppResult};
use crate::storage::broadcasts::{self, BroadcastRecord};
use crate::storage::{get_connection, subscribers};
use crate::web::auth::{AdminSession, Flash};
use crate::web::{pages, WebState};

/// How many past broadcasts the page lists
const RECENT_BROADCASTS: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct BroadcastForm {
    #[serde(default)]
    pub message: Option<String>,
}

fn load(state: &WebState) -> AppResult<(i64, Vec<BroadcastRecord>)> {
    let conn = get_connection(&state.db_pool)?;
    Ok((
        subscribers::count_active_subscribers(&conn)?,
        broadcasts::list_broadcasts(&conn, RECENT_BROADCASTS)?,
    ))
}

/// GET /broadcast
pub async fn page(State(state): State<WebState>, session: AdminSession) -> Response {
    let flashes = session.take_flashes(&state);
    match load(&state) {
        Ok((count, recent)) => {
            Html(pages::broadcast_page(&flashes, count, &recent, state.broadcaster.is_some())).into_response()
        }
        Err(e) => {
            log::error!("Failed to load broadcast page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.user_message())).into_response()
        }
    }
}

/// POST /broadcast/send
pub async fn send(State(state): State<WebState>, session: AdminSession, Form(form): Form<BroadcastForm>) -> Redirect {
    let message = form.message.unwrap_or_default();
    let flash = if message.trim().is_empty() {
        Flash::error("Message is required!")
    } else if let Some(sender) = state.broadcaster.clone() {
        match send_broadcast(&state.db_pool, sender.as_ref(), &message).await {
            Ok(outcome) => pages::broadcast_flash(&outcome),
            Err(AppError::Validation(msg)) => Flash::error(msg),
            Err(e) => {
                log::error!("Broadcast failed: {}", e);
                Flash::error("Error sending broadcast!")
            }
        }
    } else {
        Flash::error("Bot token not configured!")
    };
    session.flash(&state, flash);
    Redirect::to("/broadcast")
}

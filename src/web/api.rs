use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::storage::{get_connection, subscribers};
use crate::web::auth::AdminSession;
use crate::web::WebState;

/// GET /api/subscribers - active subscribers as JSON.
pub async fn subscribers(State(state): State<WebState>, _session: AdminSession) -> Response {
    let result = get_connection(&state.db_pool).and_then(|conn| subscribers::list_active_subscribers(&conn));
    match result {
        Ok(list) => Json(json!({
            "count": list.len(),
            "subscribers": list,
        }))
        .into_response(),
        Err(e) => {
            log::error!("Failed to list subscribers: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.user_message()}))).into_response()
        }
    }
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

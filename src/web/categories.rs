//! Category tree management.

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::catalog::admin;
use crate::storage::get_connection;
use crate::web::auth::AdminSession;
use crate::web::{flash_result, pages, WebState};

#[derive(Debug, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// GET /categories
pub async fn list(State(state): State<WebState>, session: AdminSession) -> Response {
    let flashes = session.take_flashes(&state);
    let overview = get_connection(&state.db_pool).and_then(|conn| admin::category_overview(&conn));
    match overview {
        Ok(overview) => Html(pages::categories_page(&flashes, &overview)).into_response(),
        Err(e) => {
            log::error!("Failed to load categories: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.user_message())).into_response()
        }
    }
}

/// POST /categories/add
pub async fn add(State(state): State<WebState>, session: AdminSession, Form(form): Form<CategoryForm>) -> Redirect {
    let result = get_connection(&state.db_pool).and_then(|conn| {
        admin::add_category(
            &conn,
            form.name.as_deref(),
            form.description.as_deref(),
            form.parent_id.as_deref(),
        )
    });
    session.flash(&state, flash_result(result));
    Redirect::to("/categories")
}

/// POST /categories/{id}/edit
pub async fn edit(
    State(state): State<WebState>,
    session: AdminSession,
    Path(id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let result = get_connection(&state.db_pool)
        .and_then(|conn| admin::edit_category(&conn, &id, form.name.as_deref(), form.description.as_deref()));
    session.flash(&state, flash_result(result));
    Redirect::to("/categories")
}

/// POST /categories/{id}/delete
///
/// Removes the whole subtree and every file in it.
pub async fn delete(State(state): State<WebState>, session: AdminSession, Path(id): Path<String>) -> Redirect {
    let result = get_connection(&state.db_pool).and_then(|mut conn| admin::delete_category(&mut conn, &id));
    session.flash(&state, flash_result(result));
    Redirect::to("/categories")
}

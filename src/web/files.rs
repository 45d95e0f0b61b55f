//! File records and the pending-upload queue.

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::catalog::admin;
use crate::core::error::AppResult;
use crate::storage::categories::{self, Category};
use crate::storage::files::{self, FileListing};
use crate::storage::pending::{self, PendingFile};
use crate::storage::get_connection;
use crate::web::auth::AdminSession;
use crate::web::{flash_result, pages, WebState};

#[derive(Debug, Default, Deserialize)]
pub struct FileForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub telegram_file_id: Option<String>,
}

fn load(state: &WebState) -> AppResult<(Vec<FileListing>, Vec<Category>, Vec<PendingFile>)> {
    let conn = get_connection(&state.db_pool)?;
    Ok((
        files::list_files_with_category(&conn)?,
        categories::list_categories(&conn)?,
        pending::list_pending(&conn)?,
    ))
}

/// GET /files
pub async fn list(State(state): State<WebState>, session: AdminSession) -> Response {
    let flashes = session.take_flashes(&state);
    match load(&state) {
        Ok((listings, all_categories, uploads)) => {
            Html(pages::files_page(&flashes, &listings, &all_categories, &uploads)).into_response()
        }
        Err(e) => {
            log::error!("Failed to load files: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.user_message())).into_response()
        }
    }
}

/// POST /files/add
pub async fn add(State(state): State<WebState>, session: AdminSession, Form(form): Form<FileForm>) -> Redirect {
    let result = get_connection(&state.db_pool).and_then(|conn| {
        admin::add_file(
            &conn,
            form.name.as_deref(),
            form.category_id.as_deref(),
            form.description.as_deref(),
            form.telegram_file_id.as_deref(),
        )
    });
    session.flash(&state, flash_result(result));
    Redirect::to("/files")
}

/// POST /files/add_pending/{id}
///
/// Moves a pending upload into the catalog.
pub async fn add_pending(
    State(state): State<WebState>,
    session: AdminSession,
    Path(id): Path<String>,
    Form(form): Form<FileForm>,
) -> Redirect {
    let result = get_connection(&state.db_pool).and_then(|mut conn| {
        admin::promote_pending(
            &mut conn,
            &id,
            form.name.as_deref(),
            form.category_id.as_deref(),
            form.description.as_deref(),
        )
    });
    session.flash(&state, flash_result(result));
    Redirect::to("/files")
}

/// POST /files/{id}/edit
pub async fn edit(
    State(state): State<WebState>,
    session: AdminSession,
    Path(id): Path<String>,
    Form(form): Form<FileForm>,
) -> Redirect {
    let result = get_connection(&state.db_pool).and_then(|conn| {
        admin::edit_file(
            &conn,
            &id,
            form.name.as_deref(),
            form.category_id.as_deref(),
            form.description.as_deref(),
            form.telegram_file_id.as_deref(),
        )
    });
    session.flash(&state, flash_result(result));
    Redirect::to("/files")
}

/// POST /files/{id}/delete
pub async fn delete(State(state): State<WebState>, session: AdminSession, Path(id): Path<String>) -> Redirect {
    let result = get_connection(&state.db_pool).and_then(|conn| admin::delete_file(&conn, &id));
    session.flash(&state, flash_result(result));
    Redirect::to("/files")
}

/// POST /files/pending/{id}/delete
pub async fn delete_pending(State(state): State<WebState>, session: AdminSession, Path(id): Path<String>) -> Redirect {
    let result = get_connection(&state.db_pool).and_then(|conn| admin::delete_pending(&conn, &id));
    session.flash(&state, flash_result(result));
    Redirect::to("/files")
}

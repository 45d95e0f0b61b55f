//! Admin sessions with a signed session-id cookie.
//!
//! Session state lives server-side in a [`SessionStore`]; the browser only
//! holds `<session id>.<hex HMAC-SHA256(session id)>` keyed by
//! `SESSION_SECRET`. Anonymous sessions exist only to carry flash messages
//! across the login redirect.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::extract::{Form, FromRequestParts, State};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::core::config;
use crate::web::pages;
use crate::web::WebState;

type HmacSha256 = Hmac<Sha256>;

/// Sessions older than this are treated as missing
const SESSION_MAX_AGE_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
    Warning,
}

impl FlashLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
            FlashLevel::Warning => "warning",
        }
    }
}

/// One-shot notice shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct SessionData {
    is_admin: bool,
    flashes: Vec<Flash>,
    created_at: i64,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session and returns its id.
    pub fn create_session(&self, is_admin: bool) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        if let Ok(mut sessions) = self.sessions.write() {
            sessions.retain(|_, s| s.created_at > now - SESSION_MAX_AGE_SECS);
            sessions.insert(
                session_id.clone(),
                SessionData {
                    is_admin,
                    flashes: Vec::new(),
                    created_at: now,
                },
            );
        }

        session_id
    }

    fn is_live(data: &SessionData) -> bool {
        data.created_at > chrono::Utc::now().timestamp() - SESSION_MAX_AGE_SECS
    }

    pub fn exists(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .map(|s| s.get(session_id).is_some_and(Self::is_live))
            .unwrap_or(false)
    }

    pub fn is_admin(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .map(|s| s.get(session_id).is_some_and(|d| Self::is_live(d) && d.is_admin))
            .unwrap_or(false)
    }

    pub fn remove_session(&self, session_id: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(session_id);
        }
    }

    pub fn push_flash(&self, session_id: &str, flash: Flash) {
        if let Ok(mut sessions) = self.sessions.write() {
            if let Some(data) = sessions.get_mut(session_id) {
                data.flashes.push(flash);
            }
        }
    }

    /// Returns and clears the pending flash messages.
    pub fn take_flashes(&self, session_id: &str) -> Vec<Flash> {
        self.sessions
            .write()
            .ok()
            .and_then(|mut s| s.get_mut(session_id).map(|d| std::mem::take(&mut d.flashes)))
            .unwrap_or_default()
    }
}

fn signature(secret: &str, session_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(session_id.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Cookie value for `session_id`.
pub fn sign_session_id(secret: &str, session_id: &str) -> String {
    match signature(secret, session_id) {
        Some(sig) => format!("{}.{}", session_id, sig),
        None => session_id.to_string(),
    }
}

/// Returns the session id when the cookie signature checks out.
pub fn verify_session_cookie(secret: &str, value: &str) -> Option<String> {
    let (session_id, sig) = value.rsplit_once('.')?;
    let expected = hex::decode(sig).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(session_id.as_bytes());
    mac.verify_slice(&expected).ok()?;
    Some(session_id.to_string())
}

fn session_cookie(secret: &str, session_id: &str) -> Cookie<'static> {
    Cookie::build((config::web::SESSION_COOKIE, sign_session_id(secret, session_id)))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Verified id of a live session carried by the request, if any.
pub fn current_session(jar: &CookieJar, state: &WebState) -> Option<String> {
    let cookie = jar.get(config::web::SESSION_COOKIE)?;
    let session_id = verify_session_cookie(&state.secret, cookie.value())?;
    state.sessions.exists(&session_id).then_some(session_id)
}

/// Reuses the visitor's session or starts an anonymous one.
fn ensure_session(jar: CookieJar, state: &WebState) -> (CookieJar, String) {
    match current_session(&jar, state) {
        Some(id) => (jar, id),
        None => {
            let id = state.sessions.create_session(false);
            let jar = jar.add(session_cookie(&state.secret, &id));
            (jar, id)
        }
    }
}

/// Proof that the request carries a logged-in admin session.
///
/// Handlers take this as an argument; requests without it are redirected
/// to `/login` before the handler runs.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session_id: String,
}

impl AdminSession {
    pub fn flash(&self, state: &WebState, flash: Flash) {
        state.sessions.push_flash(&self.session_id, flash);
    }

    pub fn take_flashes(&self, state: &WebState) -> Vec<Flash> {
        state.sessions.take_flashes(&self.session_id)
    }
}

impl FromRequestParts<WebState> for AdminSession {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &WebState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match current_session(&jar, state) {
            Some(session_id) if state.sessions.is_admin(&session_id) => Ok(AdminSession { session_id }),
            _ => Err(Redirect::to("/login")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub admin_id: Option<String>,
}

/// GET /login
pub async fn login_page(State(state): State<WebState>, jar: CookieJar) -> Response {
    let flashes = current_session(&jar, &state)
        .map(|id| state.sessions.take_flashes(&id))
        .unwrap_or_default();
    axum::response::Html(pages::login_page(&flashes)).into_response()
}

/// POST /login
pub async fn login(State(state): State<WebState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let submitted = form.admin_id.as_deref().map(str::trim).unwrap_or_default();
    let expected = state.admin_id.trim();

    if !expected.is_empty() && submitted == expected {
        if let Some(old) = current_session(&jar, &state) {
            state.sessions.remove_session(&old);
        }
        let session_id = state.sessions.create_session(true);
        state.sessions.push_flash(&session_id, Flash::success("Login successful!"));
        log::info!("Admin logged in to the web panel");
        let jar = jar.add(session_cookie(&state.secret, &session_id));
        return (jar, Redirect::to("/")).into_response();
    }

    log::warn!("Rejected admin login attempt");
    let (jar, session_id) = ensure_session(jar, &state);
    state.sessions.push_flash(&session_id, Flash::error("Invalid admin ID!"));
    (jar, Redirect::to("/login")).into_response()
}

/// GET /logout
pub async fn logout(State(state): State<WebState>, jar: CookieJar) -> Response {
    if let Some(old) = current_session(&jar, &state) {
        state.sessions.remove_session(&old);
    }
    let session_id = state.sessions.create_session(false);
    state.sessions.push_flash(&session_id, Flash::success("Logged out successfully!"));
    let jar = jar.add(session_cookie(&state.secret, &session_id));
    (jar, Redirect::to("/login")).into_response()
}

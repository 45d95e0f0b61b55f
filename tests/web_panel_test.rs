//! Admin panel requests through the real router.
//!
//! Run with: cargo test --test web_panel_test

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use common::TestDb;
use fileshelf::broadcast::BroadcastSender;
use fileshelf::core::{AppError, AppResult};
use fileshelf::storage::files::{self, NewFile};
use fileshelf::storage::{broadcasts, categories, pending, subscribers};
use fileshelf::web::{router, WebState};
use tower::ServiceExt;

const ADMIN_ID: &str = "424242";

/// Fails for every user id listed in `failing`.
struct FakeSender {
    failing: Vec<i64>,
    calls: AtomicUsize,
}

#[async_trait]
impl BroadcastSender for FakeSender {
    async fn send_text(&self, user_id: i64, _text: &str) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&user_id) {
            Err(AppError::Validation("blocked by user".into()))
        } else {
            Ok(())
        }
    }
}

fn app(db: &TestDb, sender: Option<Arc<dyn BroadcastSender>>) -> Router {
    router(WebState::new(Arc::clone(&db.pool), "test-secret", ADMIN_ID, sender))
}

async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

/// `name=value` part of the Set-Cookie header.
fn session_cookie(resp: &Response) -> String {
    let raw = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    raw.split(';').next().unwrap().to_string()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

async fn login(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(post("/login", None, &format!("admin_id={}", ADMIN_ID)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    session_cookie(&resp)
}

#[tokio::test]
async fn test_pages_require_login() {
    let db = TestDb::new();
    let app = app(&db, None);

    for uri in ["/", "/categories", "/files", "/broadcast", "/api/subscribers"] {
        let resp = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&resp), "/login");
    }

    let resp = app
        .clone()
        .oneshot(post("/categories/add", None, "name=Apps"))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/login");
    assert_eq!(categories::count_categories(&db.conn()).unwrap(), 0);
}

#[tokio::test]
async fn test_forged_cookie_is_rejected() {
    let db = TestDb::new();
    let app = app(&db, None);
    let cookie = login(&app).await;

    let forged = format!("{}00", cookie);
    let resp = app.clone().oneshot(get("/", Some(&forged))).await.unwrap();
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_login_failure_and_success() {
    let db = TestDb::new();
    let app = app(&db, None);

    let resp = app.clone().oneshot(post("/login", None, "admin_id=nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    let anon = session_cookie(&resp);
    let page = body_text(app.clone().oneshot(get("/login", Some(&anon))).await.unwrap()).await;
    assert!(page.contains("Invalid admin ID!"));

    let cookie = login(&app).await;
    let resp = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_text(resp).await;
    assert!(page.contains("Login successful!"));
    assert!(page.contains("Dashboard"));

    // Flashes are shown once
    let page = body_text(app.clone().oneshot(get("/", Some(&cookie))).await.unwrap()).await;
    assert!(!page.contains("Login successful!"));

    let resp = app.clone().oneshot(get("/logout", Some(&cookie))).await.unwrap();
    assert_eq!(location(&resp), "/login");
    let resp = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_add_category_validation_and_success() {
    let db = TestDb::new();
    let app = app(&db, None);
    let cookie = login(&app).await;

    let resp = app
        .clone()
        .oneshot(post("/categories/add", Some(&cookie), "name=++&description="))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/categories");
    let page = body_text(app.clone().oneshot(get("/categories", Some(&cookie))).await.unwrap()).await;
    assert!(page.contains("Category name is required!"));
    assert_eq!(categories::count_categories(&db.conn()).unwrap(), 0);

    let resp = app
        .clone()
        .oneshot(post("/categories/add", Some(&cookie), "name=Apps&description=Android+apps&parent_id="))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/categories");
    let page = body_text(app.clone().oneshot(get("/categories", Some(&cookie))).await.unwrap()).await;
    assert!(page.contains("added successfully!"));
    assert!(page.contains("Android apps"));

    let all = categories::list_categories(&db.conn()).unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].is_root());
}

#[tokio::test]
async fn test_delete_category_cascades() {
    let db = TestDb::new();
    let (apps, games) = {
        let conn = db.conn();
        let apps = categories::insert_category(&conn, "Apps", None, None).unwrap();
        let games = categories::insert_category(&conn, "Games", None, Some(&apps)).unwrap();
        files::insert_file(
            &conn,
            &NewFile {
                name: "demo.apk",
                category_id: &games,
                telegram_file_id: Some("BQAC"),
                description: None,
                size: None,
                mime_type: None,
            },
        )
        .unwrap();
        (apps, games)
    };
    let app = app(&db, None);
    let cookie = login(&app).await;

    let resp = app
        .clone()
        .oneshot(post(&format!("/categories/{}/delete", apps), Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/categories");

    let conn = db.conn();
    assert_eq!(categories::count_categories(&conn).unwrap(), 0);
    assert!(categories::get_category(&conn, &games).unwrap().is_none());
    assert_eq!(files::count_files(&conn).unwrap(), 0);
}

#[tokio::test]
async fn test_promote_pending_upload() {
    let db = TestDb::new();
    let (apps, pending_id) = {
        let conn = db.conn();
        let apps = categories::insert_category(&conn, "Apps", None, None).unwrap();
        let pending_id = pending::insert_pending(
            &conn,
            &pending::NewPendingFile {
                telegram_file_id: "BQACAgIAAyy",
                name: "manual.pdf",
                size: Some(2048),
                mime_type: Some("application/pdf"),
            },
        )
        .unwrap();
        (apps, pending_id)
    };
    let app = app(&db, None);
    let cookie = login(&app).await;

    // Missing category keeps the upload pending
    app.clone()
        .oneshot(post(
            &format!("/files/add_pending/{}", pending_id),
            Some(&cookie),
            "name=Manual&category_id=",
        ))
        .await
        .unwrap();
    let page = body_text(app.clone().oneshot(get("/files", Some(&cookie))).await.unwrap()).await;
    assert!(page.contains("Category and file name are required!"));
    assert_eq!(pending::count_pending(&db.conn()).unwrap(), 1);

    app.clone()
        .oneshot(post(
            &format!("/files/add_pending/{}", pending_id),
            Some(&cookie),
            &format!("name=Manual&category_id={}&description=User+guide", apps),
        ))
        .await
        .unwrap();

    let conn = db.conn();
    assert_eq!(pending::count_pending(&conn).unwrap(), 0);
    let all = files::list_files(&conn).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Manual");
    assert_eq!(all[0].telegram_file_id.as_deref(), Some("BQACAgIAAyy"));
    assert_eq!(all[0].size, Some(2048));
    assert_eq!(all[0].description.as_deref(), Some("User guide"));
}

#[tokio::test]
async fn test_broadcast_counts_failures() {
    let db = TestDb::new();
    {
        let conn = db.conn();
        for user_id in [1, 2, 3] {
            subscribers::upsert_subscriber(&conn, user_id, Some("User"), None).unwrap();
        }
        subscribers::set_subscriber_active(&conn, 3, false).unwrap();
        subscribers::upsert_subscriber(&conn, 4, None, None).unwrap();
    }
    let sender = Arc::new(FakeSender {
        failing: vec![2],
        calls: AtomicUsize::new(0),
    });
    let app = app(&db, Some(sender.clone() as Arc<dyn BroadcastSender>));
    let cookie = login(&app).await;

    let resp = app
        .clone()
        .oneshot(post("/broadcast/send", Some(&cookie), "message=%3Cb%3EHello%3C%2Fb%3E"))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/broadcast");

    let page = body_text(app.clone().oneshot(get("/broadcast", Some(&cookie))).await.unwrap()).await;
    assert!(page.contains("Broadcast sent to 2 subscribers! 1 failed."));
    assert_eq!(sender.calls.load(Ordering::SeqCst), 3);

    let history = broadcasts::list_broadcasts(&db.conn(), 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message, "<b>Hello</b>");
    assert_eq!((history[0].sent_to_count, history[0].failed_count), (2, 1));
}

#[tokio::test]
async fn test_broadcast_refused_without_bot_or_text() {
    let db = TestDb::new();
    subscribers::upsert_subscriber(&db.conn(), 1, None, None).unwrap();
    let app = app(&db, None);
    let cookie = login(&app).await;

    app.clone()
        .oneshot(post("/broadcast/send", Some(&cookie), "message=hi"))
        .await
        .unwrap();
    let page = body_text(app.clone().oneshot(get("/broadcast", Some(&cookie))).await.unwrap()).await;
    assert!(page.contains("Bot token not configured!"));

    app.clone()
        .oneshot(post("/broadcast/send", Some(&cookie), "message=+++"))
        .await
        .unwrap();
    let page = body_text(app.clone().oneshot(get("/broadcast", Some(&cookie))).await.unwrap()).await;
    assert!(page.contains("Message is required!"));

    assert!(broadcasts::list_broadcasts(&db.conn(), 10).unwrap().is_empty());
}

#[tokio::test]
async fn test_subscribers_api_and_health() {
    let db = TestDb::new();
    {
        let conn = db.conn();
        subscribers::upsert_subscriber(&conn, 10, Some("Ann"), Some("ann")).unwrap();
        subscribers::upsert_subscriber(&conn, 11, Some("Bob"), None).unwrap();
        subscribers::set_subscriber_active(&conn, 11, false).unwrap();
    }
    let app = app(&db, None);

    let resp = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "ok");

    let cookie = login(&app).await;
    let resp = app.clone().oneshot(get("/api/subscribers", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["count"], 1);
    assert_eq!(json["subscribers"][0]["user_id"], 10);
    assert_eq!(json["subscribers"][0]["username"], "ann");
}

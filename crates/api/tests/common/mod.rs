//! Shared harness for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use tandem_api::config::ServerConfig;
use tandem_api::router::build_app_router;
use tandem_api::state::AppState;
use tandem_notify::sender::{DisabledSender, EmailSender, PushSender, SendError};
use tandem_notify::ReminderConfig;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and disabled channel senders.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_senders(pool, Arc::new(DisabledSender), Arc::new(DisabledSender))
}

/// Build the application router with caller-provided channel senders, for
/// tests that assert on dispatch behaviour.
pub fn build_test_app_with_senders(
    pool: PgPool,
    email: Arc<dyn EmailSender>,
    push: Arc<dyn PushSender>,
) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        reminders: ReminderConfig::default(),
        email,
        push,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with an empty body through the router.
pub async fn post(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST and assert a 200, returning the parsed JSON body.
pub async fn post_ok(app: Router, uri: &str) -> serde_json::Value {
    let response = post(app, uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Sender doubles
// ---------------------------------------------------------------------------

/// Email double that records each delivery's recipient and subject.
#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingEmailSender {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), SendError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row fixtures
// ---------------------------------------------------------------------------

/// Insert a user, a single-member pair, and an upcoming event, returning the
/// user's ID.
pub async fn seed_upcoming_event(pool: &PgPool, minutes_ahead: i64) -> i64 {
    let user: i64 = sqlx::query_scalar(
        "INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id",
    )
    .bind("ana@example.com")
    .bind("Ana")
    .fetch_one(pool)
    .await
    .unwrap();

    let pair: i64 = sqlx::query_scalar("INSERT INTO pairs DEFAULT VALUES RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO pair_members (pair_id, user_id) VALUES ($1, $2)")
        .bind(pair)
        .bind(user)
        .execute(pool)
        .await
        .unwrap();

    sqlx::query(
        "INSERT INTO calendar_events (pair_id, title, starts_at) \
         VALUES ($1, $2, NOW() + make_interval(mins => $3))",
    )
    .bind(pair)
    .bind("Dinner")
    .bind(minutes_ahead as i32)
    .execute(pool)
    .await
    .unwrap();

    user
}

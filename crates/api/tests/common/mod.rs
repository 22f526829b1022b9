//! Shared helpers for API integration tests.
//!
//! Builds the application through the same `build_app_router` the binary
//! uses, so tests exercise the production middleware stack. Entities are
//! seeded directly through the repository layer; requests go through the
//! router via `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use rollcall_api::auth::jwt::{generate_access_token, JwtConfig};
use rollcall_api::config::ServerConfig;
use rollcall_api::router::build_app_router;
use rollcall_api::state::AppState;
use rollcall_db::models::session::AttendanceSession;
use rollcall_db::models::subject::{CreateSubject, Subject};
use rollcall_db::models::user::{CreateUser, User};
use rollcall_db::repositories::{SessionRepo, SubjectRepo, UserRepo};
use rollcall_events::EventBus;

/// Signing secret shared by [`test_config`] and [`token_for`].
const TEST_JWT_SECRET: &str = "integration-test-secret-with-plenty-of-entropy";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router plus a handle to its event bus, so
/// tests can subscribe and assert on published events.
pub fn build_test_app(pool: PgPool) -> (Router, Arc<EventBus>) {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    (build_app_router(state, &config), event_bus)
}

/// Issue a Bearer token for a seeded user.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_config().jwt)
        .expect("token generation should succeed")
}

/// Seed a user with the given role.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    create_user_with_parent(pool, email, role, None).await
}

/// Seed a user with a parent notification address.
pub async fn create_user_with_parent(
    pool: &PgPool,
    email: &str,
    role: &str,
    parent_email: Option<&str>,
) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            full_name: format!("Test {role} {email}"),
            role: role.to_string(),
            parent_email: parent_email.map(str::to_string),
            is_approved: Some(true),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Seed a subject owned by a teacher.
pub async fn create_subject(pool: &PgPool, teacher: &User, code: &str) -> Subject {
    SubjectRepo::create(
        pool,
        &CreateSubject {
            name: format!("Subject {code}"),
            code: code.to_string(),
            teacher_id: teacher.id,
        },
    )
    .await
    .expect("subject creation should succeed")
}

/// Seed an active session for a subject, directly through the repository.
pub async fn create_session(
    pool: &PgPool,
    subject: &Subject,
    mode: &str,
) -> AttendanceSession {
    SessionRepo::create(
        pool,
        subject.id,
        subject.teacher_id,
        "Test session",
        mode,
        None,
    )
    .await
    .expect("session creation should succeed")
}

/// Send a request through the router and parse the JSON response body.
pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should not fail at the transport level");

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

//! Integration tests for login and the notification surface.

mod common;

use axum::http::{Method, StatusCode};
use common::*;
use rollcall_api::auth::password::hash_password;
use rollcall_db::models::user::CreateUser;
use rollcall_db::repositories::{NotificationRepo, UserRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_issues_a_usable_token(pool: PgPool) {
    let hash = hash_password("hunter2-but-longer").unwrap();
    UserRepo::create(
        &pool,
        &CreateUser {
            email: "login@example.com".to_string(),
            password_hash: hash,
            full_name: "Login Teacher".to_string(),
            role: "teacher".to_string(),
            parent_email: None,
            is_approved: Some(true),
        },
    )
    .await
    .unwrap();

    let (app, _bus) = build_test_app(pool);

    let (status, json) = request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(serde_json::json!({
            "email": "login@example.com",
            "password": "hunter2-but-longer"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let token = json["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(json["data"]["user"]["role"], "teacher");
    // The password hash must never appear in a response.
    assert!(json["data"]["user"].get("password_hash").is_none());

    // The issued token authenticates a protected route.
    let (status, _) = request(&app, Method::GET, "/api/v1/sessions", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_is_401(pool: PgPool) {
    let hash = hash_password("correct-password").unwrap();
    UserRepo::create(
        &pool,
        &CreateUser {
            email: "login@example.com".to_string(),
            password_hash: hash,
            full_name: "Login User".to_string(),
            role: "student".to_string(),
            parent_email: None,
            is_approved: Some(true),
        },
    )
    .await
    .unwrap();

    let (app, _bus) = build_test_app(pool);

    let (status, json) = request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(serde_json::json!({
            "email": "login@example.com",
            "password": "wrong-password"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_email_gets_the_same_error(pool: PgPool) {
    let (app, _bus) = build_test_app(pool);

    let (status, json) = request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(serde_json::json!({
            "email": "nobody@example.com",
            "password": "whatever"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid email or password");
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn notification_listing_and_read_flow(pool: PgPool) {
    let student = create_user(&pool, "s@example.com", "student").await;
    let other = create_user(&pool, "o@example.com", "student").await;

    for n in 0..3 {
        NotificationRepo::create(
            &pool,
            student.id,
            "attendance.marked",
            "in_app",
            &serde_json::json!({ "n": n }),
        )
        .await
        .unwrap();
    }

    let (app, _bus) = build_test_app(pool);
    let token = token_for(&student);

    let (status, json) = request(
        &app,
        Method::GET,
        "/api/v1/notifications/unread-count",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["unread_count"], 3);

    let (_, json) = request(&app, Method::GET, "/api/v1/notifications", Some(&token), None).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    let first_id = items[0]["id"].as_i64().unwrap();

    // Another user cannot read someone else's notification.
    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/api/v1/notifications/{first_id}/read"),
        Some(&token_for(&other)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner can.
    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/api/v1/notifications/{first_id}/read"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = request(
        &app,
        Method::POST,
        "/api/v1/notifications/read-all",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(json["data"]["marked_read"], 2);

    let (_, json) = request(
        &app,
        Method::GET,
        "/api/v1/notifications/unread-count",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(json["data"]["unread_count"], 0);
}

//! Integration tests for the aggregation engine (leaderboard + reports).

mod common;

use axum::http::{Method, StatusCode};
use common::*;
use rollcall_db::models::attendance::UpsertAttendance;
use rollcall_db::repositories::AttendanceRepo;
use rollcall_core::types::DbId;
use sqlx::PgPool;

/// Seed one attendance record directly through the repository.
async fn seed_record(
    pool: &PgPool,
    session_id: DbId,
    teacher_id: DbId,
    subject_id: DbId,
    student_id: DbId,
    status: &str,
) {
    AttendanceRepo::upsert(
        pool,
        &UpsertAttendance {
            session_id,
            student_id,
            teacher_id,
            subject_id,
            status: status.to_string(),
            mode: "manual".to_string(),
            confidence: None,
            liveness: None,
            quality: None,
            image_ref: None,
            notes: None,
        },
    )
    .await
    .expect("record seed should succeed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn leaderboard_scores_stay_in_bounds_and_include_everyone(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let subject = create_subject(&pool, &teacher, "MATH-1").await;

    let perfect = create_user(&pool, "perfect@example.com", "student").await;
    let mixed = create_user(&pool, "mixed@example.com", "student").await;
    let absent_only = create_user(&pool, "absent@example.com", "student").await;
    // This student has no records at all in the window.
    let idle = create_user(&pool, "idle@example.com", "student").await;

    // Four sessions; each student gets one record per session they attended.
    for i in 0..4 {
        let session = create_session(&pool, &subject, "manual").await;
        seed_record(&pool, session.id, teacher.id, subject.id, perfect.id, "present").await;
        let mixed_status = if i < 2 { "present" } else { "absent" };
        seed_record(&pool, session.id, teacher.id, subject.id, mixed.id, mixed_status).await;
        seed_record(&pool, session.id, teacher.id, subject.id, absent_only.id, "absent").await;
    }

    let (app, _bus) = build_test_app(pool);
    let (status, json) = request(
        &app,
        Method::GET,
        "/api/v1/leaderboard?timeframe=week&category=attendance",
        Some(&token_for(&idle)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = json["data"].as_array().unwrap();
    // All four approved students are listed, including the one with zero
    // records.
    assert_eq!(entries.len(), 4);

    for entry in entries {
        let score = entry["score"].as_i64().unwrap();
        assert!((0..=100).contains(&score), "score out of bounds: {score}");
    }

    // Sorted descending: 100, 50, 0, 0.
    assert_eq!(entries[0]["student_id"], perfect.id);
    assert_eq!(entries[0]["score"], 100);
    assert_eq!(entries[1]["student_id"], mixed.id);
    assert_eq!(entries[1]["score"], 50);
    assert_eq!(entries[2]["score"], 0);
    assert_eq!(entries[3]["score"], 0);

    let zero_scorers: Vec<i64> = entries[2..]
        .iter()
        .map(|e| e["student_id"].as_i64().unwrap())
        .collect();
    assert!(zero_scorers.contains(&idle.id), "zero-record student must be listed");
    assert!(zero_scorers.contains(&absent_only.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn punctuality_ignores_late_arrivals(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let subject = create_subject(&pool, &teacher, "PHY-1").await;
    let student = create_user(&pool, "late@example.com", "student").await;

    for status in ["present", "late", "late", "present"] {
        let session = create_session(&pool, &subject, "manual").await;
        seed_record(&pool, session.id, teacher.id, subject.id, student.id, status).await;
    }

    let (app, _bus) = build_test_app(pool);

    // Attendance counts late as attended: 4/4.
    let (_, json) = request(
        &app,
        Method::GET,
        "/api/v1/leaderboard?category=attendance",
        Some(&token_for(&student)),
        None,
    )
    .await;
    assert_eq!(json["data"][0]["score"], 100);

    // Punctuality does not: 2/4.
    let (_, json) = request(
        &app,
        Method::GET,
        "/api/v1/leaderboard?category=punctuality",
        Some(&token_for(&student)),
        None,
    )
    .await;
    assert_eq!(json["data"][0]["score"], 50);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_timeframe_is_rejected(pool: PgPool) {
    let student = create_user(&pool, "s@example.com", "student").await;
    let (app, _bus) = build_test_app(pool);

    let (status, json) = request(
        &app,
        Method::GET,
        "/api/v1/leaderboard?timeframe=decade",
        Some(&token_for(&student)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_report_counts_and_rate(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let subject = create_subject(&pool, &teacher, "CS-1").await;
    let session = create_session(&pool, &subject, "manual").await;

    let students = [
        ("p1@example.com", "present"),
        ("p2@example.com", "present"),
        ("l1@example.com", "late"),
        ("a1@example.com", "absent"),
    ];
    for (email, status) in students {
        let student = create_user(&pool, email, "student").await;
        seed_record(&pool, session.id, teacher.id, subject.id, student.id, status).await;
    }

    let (app, _bus) = build_test_app(pool);
    let (status, json) = request(
        &app,
        Method::GET,
        "/api/v1/reports?type=summary",
        Some(&token_for(&teacher)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 4);
    assert_eq!(json["data"]["present"], 2);
    assert_eq!(json["data"]["late"], 1);
    assert_eq!(json["data"]["absent"], 1);
    assert_eq!(json["data"]["on_leave"], 0);
    // (2 present + 1 late) / 4 = 75%.
    assert_eq!(json["data"]["attendance_rate"], 75.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_wise_report_groups_per_student(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let subject = create_subject(&pool, &teacher, "CS-2").await;
    let alpha = create_user(&pool, "alpha@example.com", "student").await;
    let beta = create_user(&pool, "beta@example.com", "student").await;

    for status in ["present", "present", "absent"] {
        let session = create_session(&pool, &subject, "manual").await;
        seed_record(&pool, session.id, teacher.id, subject.id, alpha.id, status).await;
        seed_record(&pool, session.id, teacher.id, subject.id, beta.id, "present").await;
    }

    let (app, _bus) = build_test_app(pool);
    let (status, json) = request(
        &app,
        Method::GET,
        &format!("/api/v1/reports?type=student_wise&subject_id={}", subject.id),
        Some(&token_for(&teacher)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);

    let alpha_row = rows
        .iter()
        .find(|r| r["student_id"] == alpha.id)
        .expect("alpha row");
    assert_eq!(alpha_row["total"], 3);
    assert_eq!(alpha_row["present"], 2);
    // 2/3 → 66.67 with two-decimal rounding.
    assert_eq!(alpha_row["attendance_rate"], 66.67);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn detailed_report_returns_joined_rows(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let subject = create_subject(&pool, &teacher, "CS-3").await;
    let session = create_session(&pool, &subject, "manual").await;
    let student = create_user(&pool, "s@example.com", "student").await;
    seed_record(&pool, session.id, teacher.id, subject.id, student.id, "present").await;

    let (app, _bus) = build_test_app(pool);
    let (status, json) = request(
        &app,
        Method::GET,
        "/api/v1/reports?type=detailed",
        Some(&token_for(&teacher)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["summary"]["total"], 1);
    let rows = json["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["subject_name"], subject.name);
    assert_eq!(rows[0]["session_label"], "Test session");
    assert_eq!(rows[0]["status"], "present");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_report_type_is_rejected(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let (app, _bus) = build_test_app(pool);

    let (status, json) = request(
        &app,
        Method::GET,
        "/api/v1/reports?type=hourly",
        Some(&token_for(&teacher)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

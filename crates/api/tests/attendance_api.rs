//! Integration tests for the attendance ledger and the recognition path.
//!
//! The load-bearing property is idempotency: any number of markings for the
//! same (session, student) leave exactly one record, reflecting the latest
//! write. Both the manual and recognition flows are exercised end-to-end,
//! including the event published for the notification dispatcher.

mod common;

use axum::http::{Method, StatusCode};
use common::*;
use rollcall_db::repositories::{AttendanceRepo, RecognitionAttemptRepo};
use rollcall_events::bus::EVENT_ATTENDANCE_MARKED;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn marking_twice_leaves_one_record_with_latest_status(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let student = create_user(&pool, "s@example.com", "student").await;
    let subject = create_subject(&pool, &teacher, "MATH-1").await;
    let session = create_session(&pool, &subject, "manual").await;
    let (app, _bus) = build_test_app(pool.clone());
    let token = token_for(&teacher);
    let uri = format!("/api/v1/sessions/{}/attendance", session.id);

    let (status, first) = request(
        &app,
        Method::POST,
        &uri,
        Some(&token),
        Some(serde_json::json!({ "student_id": student.id, "status": "present" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = request(
        &app,
        Method::POST,
        &uri,
        Some(&token),
        Some(serde_json::json!({ "student_id": student.id, "status": "late" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same row both times, status reflects the latest write.
    assert_eq!(first["data"]["id"], second["data"]["id"]);
    assert_eq!(second["data"]["status"], "late");

    let records = AttendanceRepo::list_for_session(&pool, session.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 1, "no duplicate record may exist");
    assert_eq!(records[0].status, "late");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_marks_their_own_attendance(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let student = create_user(&pool, "s@example.com", "student").await;
    let subject = create_subject(&pool, &teacher, "ENG-1").await;
    let session = create_session(&pool, &subject, "manual").await;
    let (app, _bus) = build_test_app(pool);

    let (status, json) = request(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/attendance", session.id),
        Some(&token_for(&student)),
        Some(serde_json::json!({ "student_id": student.id, "status": "present" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["mode"], "manual");
    assert_eq!(json["data"]["parent_notified"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_cannot_mark_a_classmate(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let student = create_user(&pool, "s@example.com", "student").await;
    let classmate = create_user(&pool, "c@example.com", "student").await;
    let subject = create_subject(&pool, &teacher, "ART-1").await;
    let session = create_session(&pool, &subject, "manual").await;
    let (app, _bus) = build_test_app(pool);

    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/attendance", session.id),
        Some(&token_for(&student)),
        Some(serde_json::json!({ "student_id": classmate.id, "status": "present" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn on_leave_status_is_stored_as_is(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let student = create_user(&pool, "s@example.com", "student").await;
    let subject = create_subject(&pool, &teacher, "MUS-1").await;
    let session = create_session(&pool, &subject, "manual").await;
    let (app, _bus) = build_test_app(pool.clone());

    let (status, json) = request(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/attendance", session.id),
        Some(&token_for(&teacher)),
        Some(serde_json::json!({ "student_id": student.id, "status": "on_leave" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // Never silently remapped to `absent`.
    assert_eq!(json["data"]["status"], "on_leave");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn marking_publishes_one_event(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let student = create_user(&pool, "s@example.com", "student").await;
    let subject = create_subject(&pool, &teacher, "PE-1").await;
    let session = create_session(&pool, &subject, "manual").await;
    let (app, bus) = build_test_app(pool);
    let mut rx = bus.subscribe();

    let (status, json) = request(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/attendance", session.id),
        Some(&token_for(&teacher)),
        Some(serde_json::json!({ "student_id": student.id, "status": "absent" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The handler publishes before responding, so the event is buffered.
    let event = rx.try_recv().expect("one event should have been published");
    assert_eq!(event.event_type, EVENT_ATTENDANCE_MARKED);
    assert_eq!(event.payload["record_id"], json["data"]["id"]);
    assert_eq!(event.payload["status"], "absent");
    assert!(rx.try_recv().is_err(), "exactly one event per marking");
}

// ---------------------------------------------------------------------------
// Recognition path
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn accepted_attempt_marks_present_and_logs(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let student = create_user(&pool, "a@example.com", "student").await;
    let subject = create_subject(&pool, &teacher, "CS-101").await;
    let session = create_session(&pool, &subject, "auto_recognition").await;
    let (app, bus) = build_test_app(pool.clone());
    let mut rx = bus.subscribe();

    let (status, json) = request(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/recognition", session.id),
        Some(&token_for(&teacher)),
        Some(serde_json::json!({
            "student_id": student.id,
            "image_ref": "captures/a-001.jpg",
            "confidence": 0.96,
            "liveness": 0.90,
            "quality": 0.85
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["success"], true);
    assert_eq!(json["data"]["auto_processed"], true);
    assert_eq!(json["data"]["confidence"], 0.96);

    // AttendanceRecord(A, present, face_scan) was created.
    let record = AttendanceRepo::find_by_session_and_student(&pool, session.id, student.id)
        .await
        .unwrap()
        .expect("record should exist");
    assert_eq!(record.status, "present");
    assert_eq!(record.mode, "face_scan");
    assert_eq!(record.confidence, Some(0.96));
    assert_eq!(record.image_ref.as_deref(), Some("captures/a-001.jpg"));

    // One notification job was enqueued (as an attendance.marked event).
    let event = rx.try_recv().expect("event should have been published");
    assert_eq!(event.event_type, EVENT_ATTENDANCE_MARKED);

    // The attempt log row was appended with success = true.
    let attempts = RecognitionAttemptRepo::list_for_session(&pool, session.id)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].accepted);
    assert!(attempts[0].confidence_passed);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_attempt_is_a_normal_response_with_diagnostics(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let student = create_user(&pool, "b@example.com", "student").await;
    let subject = create_subject(&pool, &teacher, "CS-102").await;
    let session = create_session(&pool, &subject, "auto_recognition").await;
    let (app, bus) = build_test_app(pool.clone());
    let mut rx = bus.subscribe();

    let (status, json) = request(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/recognition", session.id),
        Some(&token_for(&teacher)),
        Some(serde_json::json!({
            "student_id": student.id,
            "image_ref": "captures/b-001.jpg",
            "confidence": 0.80,
            "liveness": 0.85,
            "quality": 0.80
        })),
    )
    .await;

    // A low-confidence attempt is NOT an HTTP error.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["success"], false);
    assert_eq!(json["data"]["auto_processed"], false);
    let message = json["data"]["message"].as_str().unwrap();
    assert!(message.contains("confidence 80%"), "got: {message}");
    assert!(message.contains("93%"), "got: {message}");

    // No attendance record, no event.
    let record = AttendanceRepo::find_by_session_and_student(&pool, session.id, student.id)
        .await
        .unwrap();
    assert!(record.is_none());
    assert!(rx.try_recv().is_err());

    // The attempt is still logged for audit.
    let attempts = RecognitionAttemptRepo::list_for_session(&pool, session.id)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 1);
    assert!(!attempts[0].accepted);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn re_recognition_refreshes_metadata_without_duplicating(pool: PgPool) {
    let teacher = create_user(&pool, "t@example.com", "teacher").await;
    let student = create_user(&pool, "c@example.com", "student").await;
    let subject = create_subject(&pool, &teacher, "CS-103").await;
    let session = create_session(&pool, &subject, "auto_recognition").await;
    let (app, _bus) = build_test_app(pool.clone());
    let token = token_for(&teacher);
    let uri = format!("/api/v1/sessions/{}/recognition", session.id);

    for confidence in [0.94, 0.97] {
        let (status, _) = request(
            &app,
            Method::POST,
            &uri,
            Some(&token),
            Some(serde_json::json!({
                "student_id": student.id,
                "image_ref": "captures/c.jpg",
                "confidence": confidence,
                "liveness": 0.9
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let records = AttendanceRepo::list_for_session(&pool, session.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].confidence, Some(0.97));

    // Both attempts remain in the audit trail.
    let attempts = RecognitionAttemptRepo::list_for_session(&pool, session.id)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_the_owning_teacher_processes_attempts(pool: PgPool) {
    let owner = create_user(&pool, "owner@example.com", "teacher").await;
    let other = create_user(&pool, "other@example.com", "teacher").await;
    let student = create_user(&pool, "d@example.com", "student").await;
    let subject = create_subject(&pool, &owner, "CS-104").await;
    let session = create_session(&pool, &subject, "auto_recognition").await;
    let (app, _bus) = build_test_app(pool);

    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/recognition", session.id),
        Some(&token_for(&other)),
        Some(serde_json::json!({
            "student_id": student.id,
            "image_ref": "captures/d.jpg",
            "confidence": 0.99,
            "liveness": 0.99
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

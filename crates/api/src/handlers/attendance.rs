//! Handlers for the attendance ledger.
//!
//! One write path for both the manual and recognition flows: an upsert
//! keyed on (session, student). Marking twice updates the one existing
//! record; it never creates a duplicate. After the upsert commits, an
//! `attendance.marked` event is published for every marking; notification
//! delivery happens on the dispatcher's schedule and can never fail this
//! call.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use rollcall_core::attendance::{validate_status, MODE_MANUAL};
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::attendance::{AttendanceRecord, MarkAttendance, UpsertAttendance};
use rollcall_db::models::session::AttendanceSession;
use rollcall_db::repositories::{AttendanceRepo, SessionRepo, UserRepo};
use rollcall_events::bus::{DomainEvent, EVENT_ATTENDANCE_MARKED};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::policy;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/sessions/{session_id}/attendance
///
/// Mark (or re-mark) a student's attendance for a session. Callable by the
/// owning teacher for any student, or by a student for themself.
///
/// `on_leave` is stored as-is, keeping the distinction the schema models.
pub async fn mark_attendance(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    Json(input): Json<MarkAttendance>,
) -> AppResult<impl IntoResponse> {
    validate_status(&input.status)?;

    let session = SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;

    policy::ensure_can_mark(&auth, &session, input.student_id)?;

    UserRepo::find_by_id(&state.pool, input.student_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id: input.student_id,
        }))?;

    let record = AttendanceRepo::upsert(
        &state.pool,
        &UpsertAttendance {
            session_id,
            student_id: input.student_id,
            teacher_id: session.teacher_id,
            subject_id: session.subject_id,
            status: input.status.clone(),
            mode: MODE_MANUAL.to_string(),
            confidence: None,
            liveness: None,
            quality: None,
            image_ref: None,
            notes: input.notes.clone(),
        },
    )
    .await?;

    publish_marked(&state, &auth, &session, &record);

    tracing::info!(
        record_id = record.id,
        session_id,
        student_id = input.student_id,
        status = %record.status,
        "Attendance marked manually"
    );

    Ok(Json(DataResponse { data: record }))
}

/// GET /api/v1/sessions/{session_id}/records
///
/// List every attendance record for a session.
pub async fn list_records(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let session = SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;

    policy::ensure_can_view_session(&auth, &session)?;

    let records = AttendanceRepo::list_for_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse { data: records }))
}

/// Publish the `attendance.marked` event for a committed ledger write.
///
/// Shared by the manual path above and the recognition path; publishing is
/// fire-and-forget relative to the HTTP response.
pub(crate) fn publish_marked(
    state: &AppState,
    auth: &AuthUser,
    session: &AttendanceSession,
    record: &AttendanceRecord,
) {
    state.event_bus.publish(
        DomainEvent::new(EVENT_ATTENDANCE_MARKED)
            .with_source("attendance_record", record.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "record_id": record.id,
                "session_id": session.id,
                "subject_id": session.subject_id,
                "student_id": record.student_id,
                "status": record.status,
                "mode": record.mode,
            })),
    );
}

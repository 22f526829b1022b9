//! Handlers for the attendance session lifecycle.
//!
//! Sessions have exactly one state transition: Active → Ended, performed by
//! the owning teacher. Ending is terminal; there is no reopen.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use rollcall_core::attendance::validate_session_mode;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::session::CreateSession;
use rollcall_db::repositories::{SessionRepo, SubjectRepo};
use rollcall_events::bus::{DomainEvent, EVENT_SESSION_ENDED};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTeacher;
use crate::policy;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/sessions
///
/// Create a new active session. The caller must be a teacher and own the
/// referenced subject.
pub async fn create_session(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Json(input): Json<CreateSession>,
) -> AppResult<impl IntoResponse> {
    validate_session_mode(&input.mode)?;

    let subject = SubjectRepo::find_by_id(&state.pool, input.subject_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subject",
            id: input.subject_id,
        }))?;

    if subject.teacher_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owning teacher can start a session for this subject".into(),
        )));
    }

    let session = SessionRepo::create(
        &state.pool,
        input.subject_id,
        user.user_id,
        &input.label,
        &input.mode,
        input.location.as_deref(),
    )
    .await?;

    tracing::info!(
        session_id = session.id,
        subject_id = subject.id,
        teacher_id = user.user_id,
        mode = %session.mode,
        "Session created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// POST /api/v1/sessions/{session_id}/end
///
/// End a session. One-way: a second call fails with 409 and the session
/// never becomes active again.
pub async fn end_session(
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

    policy::ensure_owns_session(&auth, &session)?;

    let ended = SessionRepo::end(&state.pool, session_id).await?;
    if !ended {
        return Err(AppError::Core(CoreError::Conflict(
            "Session has already ended".into(),
        )));
    }

    // The mutation is committed; the audit event rides the bus.
    state.event_bus.publish(
        DomainEvent::new(EVENT_SESSION_ENDED)
            .with_source("attendance_session", session_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({ "session_id": session_id })),
    );

    tracing::info!(session_id, teacher_id = auth.user_id, "Session ended");

    let session = SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;

    Ok(Json(DataResponse { data: session }))
}

/// GET /api/v1/sessions/{session_id}
///
/// Fetch a single session. Visible to the owning teacher and admins.
pub async fn get_session(
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

    Ok(Json(DataResponse { data: session }))
}

/// GET /api/v1/sessions
///
/// List the caller's own sessions, newest first.
pub async fn list_sessions(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let sessions = SessionRepo::list_for_teacher(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: sessions }))
}

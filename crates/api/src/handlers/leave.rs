//! Handlers for the leave request workflow.
//!
//! Pending → Approved/Rejected, both terminal. Reviewing an already-decided
//! request is rejected with 409, never silently overwritten.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use rollcall_core::error::CoreError;
use rollcall_core::leave::{
    validate_date_range, validate_decision, validate_reason, STATUS_PENDING,
};
use rollcall_core::roles::{ROLE_STUDENT, ROLE_TEACHER};
use rollcall_core::types::DbId;
use rollcall_db::models::leave::{CreateLeaveRequest, ReviewLeaveRequest};
use rollcall_db::repositories::{LeaveRepo, SubjectRepo, UserRepo};
use rollcall_events::bus::{DomainEvent, EVENT_LEAVE_REVIEWED, EVENT_LEAVE_SUBMITTED};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStudent;
use crate::policy;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/leave-requests
///
/// Submit a leave request. Students only; the date range must run forward
/// and the reason must be non-empty.
pub async fn submit_request(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<CreateLeaveRequest>,
) -> AppResult<impl IntoResponse> {
    validate_reason(&input.reason)?;
    validate_date_range(input.start_date, input.end_date)?;

    if let Some(subject_id) = input.subject_id {
        SubjectRepo::find_by_id(&state.pool, subject_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Subject",
                id: subject_id,
            }))?;
    }

    if let Some(teacher_id) = input.teacher_id {
        let teacher = UserRepo::find_by_id(&state.pool, teacher_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Teacher",
                id: teacher_id,
            }))?;
        if teacher.role != ROLE_TEACHER {
            return Err(AppError::Core(CoreError::Validation(
                "Referenced user is not a teacher".into(),
            )));
        }
    }

    let request = LeaveRepo::create(&state.pool, user.user_id, &input).await?;

    state.event_bus.publish(
        DomainEvent::new(EVENT_LEAVE_SUBMITTED)
            .with_source("leave_request", request.id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({
                "request_id": request.id,
                "student_id": request.student_id,
                "teacher_id": request.teacher_id,
                "start_date": request.start_date,
                "end_date": request.end_date,
                "reason": request.reason,
            })),
    );

    tracing::info!(
        request_id = request.id,
        student_id = user.user_id,
        "Leave request submitted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// POST /api/v1/leave-requests/{request_id}/review
///
/// Approve or reject a pending request. Callable by the addressed teacher
/// or an admin; a decided request cannot be reviewed again.
pub async fn review_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<ReviewLeaveRequest>,
) -> AppResult<impl IntoResponse> {
    validate_decision(&input.decision)?;

    let request = LeaveRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "LeaveRequest",
            id: request_id,
        }))?;

    policy::ensure_can_review(&auth, &request)?;

    if request.status != STATUS_PENDING {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Leave request has already been {}",
            request.status
        ))));
    }

    // The WHERE status = 'pending' guard closes the race between the check
    // above and the write; a lost race surfaces as the same 409.
    let updated = LeaveRepo::review(
        &state.pool,
        request_id,
        &input.decision,
        auth.user_id,
        input.notes.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Leave request has already been decided".into(),
        ))
    })?;

    state.event_bus.publish(
        DomainEvent::new(EVENT_LEAVE_REVIEWED)
            .with_source("leave_request", updated.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "request_id": updated.id,
                "student_id": updated.student_id,
                "decision": updated.status,
                "notes": updated.review_notes,
            })),
    );

    tracing::info!(
        request_id,
        reviewer_id = auth.user_id,
        decision = %updated.status,
        "Leave request reviewed"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/leave-requests
///
/// Role-scoped listing: students see their own requests, teachers the ones
/// addressed to them, admins everything.
pub async fn list_requests(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = match auth.role.as_str() {
        ROLE_STUDENT => LeaveRepo::list_for_student(&state.pool, auth.user_id).await?,
        ROLE_TEACHER => LeaveRepo::list_for_teacher(&state.pool, auth.user_id).await?,
        _ => LeaveRepo::list_all(&state.pool).await?,
    };
    Ok(Json(DataResponse { data: requests }))
}

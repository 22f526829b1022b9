//! Handlers for recognition attempts.
//!
//! The attempt log row is appended for every attempt, accepted or not. A
//! rejection is a successful HTTP call carrying a negative result with the
//! full diagnostic, never an error status.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use rollcall_core::attendance::{MODE_FACE_SCAN, STATUS_PRESENT};
use rollcall_core::error::CoreError;
use rollcall_core::recognition::{decide, Thresholds};
use rollcall_core::types::DbId;
use rollcall_db::models::attendance::UpsertAttendance;
use rollcall_db::models::recognition::{CreateRecognitionAttempt, RecognitionRequest};
use rollcall_db::repositories::{AttendanceRepo, RecognitionAttemptRepo, SessionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::attendance::publish_marked;
use crate::middleware::auth::AuthUser;
use crate::policy;
use crate::response::DataResponse;
use crate::state::AppState;

/// Structured result of a recognition attempt.
#[derive(Debug, Serialize)]
pub struct RecognitionOutcome {
    /// Whether the attempt was accepted and attendance was marked.
    pub success: bool,
    /// User-visible diagnostic; on rejection it enumerates every failing
    /// threshold with its measured and required values.
    pub message: String,
    pub confidence: f64,
    /// True when an attendance record was written automatically.
    pub auto_processed: bool,
}

/// POST /api/v1/sessions/{session_id}/recognition
///
/// Process a recognition attempt for a session. Only the owning teacher may
/// submit attempts. The attempt is logged unconditionally; attendance is
/// upserted only when the gate accepts.
pub async fn process_attempt(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    Json(input): Json<RecognitionRequest>,
) -> AppResult<impl IntoResponse> {
    let session = SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;

    policy::ensure_owns_session(&auth, &session)?;

    UserRepo::find_by_id(&state.pool, input.student_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id: input.student_id,
        }))?;

    let decision = decide(
        input.confidence,
        input.liveness,
        input.quality,
        &Thresholds::default(),
    );

    // The audit row is appended whatever the gate decided.
    RecognitionAttemptRepo::create(
        &state.pool,
        &CreateRecognitionAttempt {
            session_id,
            student_id: input.student_id,
            image_ref: input.image_ref.clone(),
            accepted: decision.accept,
            confidence: input.confidence,
            liveness: input.liveness,
            quality: input.quality,
            confidence_passed: decision.confidence_passed,
            liveness_passed: decision.liveness_passed,
            quality_passed: decision.quality_passed,
            reason: decision.reason.clone(),
        },
    )
    .await?;

    if !decision.accept {
        tracing::info!(
            session_id,
            student_id = input.student_id,
            reason = %decision.reason,
            "Recognition attempt rejected"
        );
        return Ok(Json(DataResponse {
            data: RecognitionOutcome {
                success: false,
                message: decision.reason,
                confidence: input.confidence,
                auto_processed: false,
            },
        }));
    }

    // Accepted: idempotent upsert. Re-recognizing a student already marked
    // present only refreshes the recognition metadata.
    let record = AttendanceRepo::upsert(
        &state.pool,
        &UpsertAttendance {
            session_id,
            student_id: input.student_id,
            teacher_id: session.teacher_id,
            subject_id: session.subject_id,
            status: STATUS_PRESENT.to_string(),
            mode: MODE_FACE_SCAN.to_string(),
            confidence: Some(input.confidence),
            liveness: Some(input.liveness),
            quality: input.quality,
            image_ref: Some(input.image_ref.clone()),
            notes: None,
        },
    )
    .await?;

    publish_marked(&state, &auth, &session, &record);

    tracing::info!(
        record_id = record.id,
        session_id,
        student_id = input.student_id,
        confidence = input.confidence,
        "Recognition attempt accepted, attendance marked"
    );

    Ok(Json(DataResponse {
        data: RecognitionOutcome {
            success: true,
            message: "Face recognized; attendance marked as present".to_string(),
            confidence: input.confidence,
            auto_processed: true,
        },
    }))
}

/// GET /api/v1/sessions/{session_id}/attempts
///
/// List the attempt audit trail for a session.
pub async fn list_attempts(
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

    let attempts = RecognitionAttemptRepo::list_for_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse { data: attempts }))
}

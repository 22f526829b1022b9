//! Recognition attempt entity model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the append-only `recognition_attempts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecognitionAttempt {
    pub id: DbId,
    pub session_id: DbId,
    pub student_id: DbId,
    pub image_ref: String,
    pub accepted: bool,
    pub confidence: f64,
    pub liveness: f64,
    pub quality: Option<f64>,
    pub confidence_passed: bool,
    pub liveness_passed: bool,
    pub quality_passed: bool,
    pub reason: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request DTO for `POST /sessions/{id}/recognition`.
///
/// The scores arrive pre-computed from the external matcher; the pipeline
/// never interprets the captured image itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionRequest {
    pub student_id: DbId,
    pub image_ref: String,
    pub confidence: f64,
    pub liveness: f64,
    pub quality: Option<f64>,
}

/// Repository input for appending an attempt log row.
#[derive(Debug, Clone)]
pub struct CreateRecognitionAttempt {
    pub session_id: DbId,
    pub student_id: DbId,
    pub image_ref: String,
    pub accepted: bool,
    pub confidence: f64,
    pub liveness: f64,
    pub quality: Option<f64>,
    pub confidence_passed: bool,
    pub liveness_passed: bool,
    pub quality_passed: bool,
    pub reason: String,
}

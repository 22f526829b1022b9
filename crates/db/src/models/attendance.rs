//! Attendance record entity model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `attendance_records` table.
///
/// Exactly one row exists per (session, student); see
/// [`AttendanceRepo::upsert`](crate::repositories::AttendanceRepo::upsert).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub session_id: DbId,
    pub student_id: DbId,
    pub teacher_id: DbId,
    pub subject_id: DbId,
    pub status: String,
    pub mode: String,
    pub confidence: Option<f64>,
    pub liveness: Option<f64>,
    pub quality: Option<f64>,
    pub image_ref: Option<String>,
    pub notes: Option<String>,
    pub parent_notified: bool,
    pub parent_notified_at: Option<Timestamp>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request DTO for `POST /sessions/{id}/attendance` (manual marking).
#[derive(Debug, Clone, Deserialize)]
pub struct MarkAttendance {
    pub student_id: DbId,
    pub status: String,
    pub notes: Option<String>,
}

/// Repository input for the ledger upsert, shared by the manual and
/// recognition paths.
#[derive(Debug, Clone)]
pub struct UpsertAttendance {
    pub session_id: DbId,
    pub student_id: DbId,
    pub teacher_id: DbId,
    pub subject_id: DbId,
    pub status: String,
    pub mode: String,
    pub confidence: Option<f64>,
    pub liveness: Option<f64>,
    pub quality: Option<f64>,
    pub image_ref: Option<String>,
    pub notes: Option<String>,
}

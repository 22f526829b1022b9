//! Attendance session entity model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `attendance_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceSession {
    pub id: DbId,
    pub subject_id: DbId,
    pub teacher_id: DbId,
    pub label: String,
    pub mode: String,
    pub location: Option<String>,
    pub is_active: bool,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request DTO for `POST /sessions`. The owning teacher comes from the
/// authenticated caller, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSession {
    pub subject_id: DbId,
    pub label: String,
    pub mode: String,
    pub location: Option<String>,
}

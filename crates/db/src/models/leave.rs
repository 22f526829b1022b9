//! Leave request entity model and DTOs.

use chrono::NaiveDate;
use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `leave_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaveRequest {
    pub id: DbId,
    pub student_id: DbId,
    pub subject_id: Option<DbId>,
    pub teacher_id: Option<DbId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub description: Option<String>,
    pub status: String,
    pub reviewed_by: Option<DbId>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub teacher_notified: bool,
    pub parent_notified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request DTO for `POST /leave-requests`. The student comes from the
/// authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeaveRequest {
    pub subject_id: Option<DbId>,
    pub teacher_id: Option<DbId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub description: Option<String>,
}

/// Request DTO for `POST /leave-requests/{id}/review`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewLeaveRequest {
    /// `approved` or `rejected`.
    pub decision: String,
    pub notes: Option<String>,
}

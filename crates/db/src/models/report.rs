//! Row types for the aggregation engine (leaderboard + reports).

use chrono::NaiveDate;
use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One (student, status) pair inside the leaderboard window, ordered
/// oldest-first per student. Scoring happens in `rollcall_core`.
#[derive(Debug, Clone, FromRow)]
pub struct StatusRow {
    pub student_id: DbId,
    pub status: String,
}

/// A computed leaderboard entry.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub student_id: DbId,
    pub full_name: String,
    pub score: i64,
}

/// Optional filters shared by every report type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilters {
    pub subject_id: Option<DbId>,
    pub student_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub start_date: Option<NaiveDate>,
    /// Inclusive.
    pub end_date: Option<NaiveDate>,
}

/// Status counts over all matching records.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SummaryCounts {
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub on_leave: i64,
}

/// Per-student aggregate row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentWiseRow {
    pub student_id: DbId,
    pub student_name: String,
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub on_leave: i64,
}

/// Per-subject aggregate row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubjectWiseRow {
    pub subject_id: DbId,
    pub subject_name: String,
    pub subject_code: String,
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub on_leave: i64,
}

/// Flattened per-record row with joined context.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DetailedRow {
    pub record_id: DbId,
    pub session_id: DbId,
    pub session_label: String,
    pub subject_id: DbId,
    pub subject_name: String,
    pub student_id: DbId,
    pub student_name: String,
    pub status: String,
    pub mode: String,
    pub notes: Option<String>,
    pub recorded_at: Timestamp,
}

//! Repository for the `leave_requests` table.
//!
//! The review UPDATE is guarded by `AND status = 'pending'`, so approved
//! and rejected are terminal at the SQL level even under concurrent
//! reviews.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::leave::{CreateLeaveRequest, LeaveRequest};

/// Column list for `leave_requests` queries.
const COLUMNS: &str = "id, student_id, subject_id, teacher_id, start_date, end_date, \
    reason, description, status, reviewed_by, review_notes, reviewed_at, \
    teacher_notified, parent_notified, created_at, updated_at";

/// Provides CRUD operations for leave requests.
pub struct LeaveRepo;

impl LeaveRepo {
    /// Insert a new pending request for a student, returning the created row.
    pub async fn create(
        pool: &PgPool,
        student_id: DbId,
        input: &CreateLeaveRequest,
    ) -> Result<LeaveRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO leave_requests \
                (student_id, subject_id, teacher_id, start_date, end_date, reason, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(student_id)
            .bind(input.subject_id)
            .bind(input.teacher_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.reason)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a request by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LeaveRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leave_requests WHERE id = $1");
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record a review decision. Only matches while the request is still
    /// pending; returns `None` when it was already decided (or is gone), in
    /// which case nothing changes.
    pub async fn review(
        pool: &PgPool,
        id: DbId,
        decision: &str,
        reviewer_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<LeaveRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE leave_requests \
             SET status = $2, reviewed_by = $3, review_notes = $4, reviewed_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(id)
            .bind(decision)
            .bind(reviewer_id)
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    /// List a student's own requests, newest first.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leave_requests \
             WHERE student_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }

    /// List requests addressed to a teacher, newest first.
    pub async fn list_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leave_requests \
             WHERE teacher_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(teacher_id)
            .fetch_all(pool)
            .await
    }

    /// List every request, newest first (admin view).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leave_requests ORDER BY created_at DESC");
        sqlx::query_as::<_, LeaveRequest>(&query).fetch_all(pool).await
    }

    /// Record that the teacher notification for this request was sent.
    pub async fn mark_teacher_notified(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE leave_requests SET teacher_notified = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record that the parent notification for this request was sent.
    pub async fn mark_parent_notified(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE leave_requests SET parent_notified = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

//! Repository for the `attendance_sessions` table.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::AttendanceSession;

/// Column list for `attendance_sessions` queries.
const COLUMNS: &str = "id, subject_id, teacher_id, label, mode, location, \
    is_active, started_at, ended_at, created_at, updated_at";

/// Provides CRUD operations for attendance sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new active session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        subject_id: DbId,
        teacher_id: DbId,
        label: &str,
        mode: &str,
        location: Option<&str>,
    ) -> Result<AttendanceSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_sessions (subject_id, teacher_id, label, mode, location) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceSession>(&query)
            .bind(subject_id)
            .bind(teacher_id)
            .bind(label)
            .bind(mode)
            .bind(location)
            .fetch_one(pool)
            .await
    }

    /// Find a session by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AttendanceSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendance_sessions WHERE id = $1");
        sqlx::query_as::<_, AttendanceSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// End a session. One-way: the update only matches while the session is
    /// still active, so a second call affects zero rows and ending can never
    /// be undone.
    ///
    /// Returns `true` if the session was active and is now ended.
    pub async fn end(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE attendance_sessions \
             SET is_active = false, ended_at = NOW() \
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List sessions owned by a teacher, newest first.
    pub async fn list_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<Vec<AttendanceSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_sessions \
             WHERE teacher_id = $1 \
             ORDER BY started_at DESC"
        );
        sqlx::query_as::<_, AttendanceSession>(&query)
            .bind(teacher_id)
            .fetch_all(pool)
            .await
    }
}

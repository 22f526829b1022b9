//! Repository for the `attendance_records` ledger.
//!
//! The one-record-per-(session, student) invariant lives in the schema
//! (`uq_attendance_records_session_student`) and in [`AttendanceRepo::upsert`],
//! the single write path shared by manual marking and accepted recognition
//! attempts. Concurrent upserts for the same pair are serialized by
//! PostgreSQL's per-row atomicity; the pipeline never deletes records.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::attendance::{AttendanceRecord, UpsertAttendance};

/// Column list for `attendance_records` queries.
const COLUMNS: &str = "id, session_id, student_id, teacher_id, subject_id, status, mode, \
    confidence, liveness, quality, image_ref, notes, parent_notified, parent_notified_at, \
    recorded_at, created_at, updated_at";

/// Provides the idempotent write path and reads for attendance records.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Upsert the record for (session, student), returning the resulting row.
    ///
    /// An existing row has its status, mode, and recognition metadata
    /// overwritten and `recorded_at` refreshed; notes are only replaced when
    /// the input carries some, so a face-scan refresh does not wipe a
    /// teacher's annotations.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertAttendance,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_records \
                (session_id, student_id, teacher_id, subject_id, status, mode, \
                 confidence, liveness, quality, image_ref, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT ON CONSTRAINT uq_attendance_records_session_student DO UPDATE SET \
                status = EXCLUDED.status, \
                mode = EXCLUDED.mode, \
                confidence = EXCLUDED.confidence, \
                liveness = EXCLUDED.liveness, \
                quality = EXCLUDED.quality, \
                image_ref = EXCLUDED.image_ref, \
                notes = COALESCE(EXCLUDED.notes, attendance_records.notes), \
                recorded_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(input.session_id)
            .bind(input.student_id)
            .bind(input.teacher_id)
            .bind(input.subject_id)
            .bind(&input.status)
            .bind(&input.mode)
            .bind(input.confidence)
            .bind(input.liveness)
            .bind(input.quality)
            .bind(&input.image_ref)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find the record for a (session, student) pair.
    pub async fn find_by_session_and_student(
        pool: &PgPool,
        session_id: DbId,
        student_id: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records \
             WHERE session_id = $1 AND student_id = $2"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(session_id)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// List every record for a session.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records \
             WHERE session_id = $1 \
             ORDER BY recorded_at ASC"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Record that the parent notification for this record was sent.
    pub async fn mark_parent_notified(pool: &PgPool, record_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE attendance_records \
             SET parent_notified = true, parent_notified_at = NOW() \
             WHERE id = $1",
        )
        .bind(record_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

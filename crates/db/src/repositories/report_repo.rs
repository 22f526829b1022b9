//! Read-only queries for the aggregation engine.
//!
//! Everything here is recomputed on each call; there is no cached or
//! materialized state. Optional filters use the `($n IS NULL OR col = $n)`
//! pattern so the SQL stays static.

use rollcall_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::report::{
    DetailedRow, ReportFilters, StatusRow, StudentWiseRow, SubjectWiseRow, SummaryCounts,
};

/// Cap on flattened rows returned by a detailed report.
const DETAILED_ROW_CAP: i64 = 1000;

/// Shared filter fragment over `attendance_records ar`; binds $1..$5.
const FILTER_CLAUSE: &str = "\
    ($1::BIGINT IS NULL OR ar.subject_id = $1) \
    AND ($2::BIGINT IS NULL OR ar.student_id = $2) \
    AND ($3::BIGINT IS NULL OR ar.session_id = $3) \
    AND ($4::DATE IS NULL OR ar.recorded_at >= $4) \
    AND ($5::DATE IS NULL OR ar.recorded_at < $5 + INTERVAL '1 day')";

/// Status count fragment shared by the grouped and summary queries.
const COUNT_COLUMNS: &str = "\
    COUNT(*) AS total, \
    COUNT(*) FILTER (WHERE ar.status = 'present') AS present, \
    COUNT(*) FILTER (WHERE ar.status = 'absent') AS absent, \
    COUNT(*) FILTER (WHERE ar.status = 'late') AS late, \
    COUNT(*) FILTER (WHERE ar.status = 'on_leave') AS on_leave";

/// Provides aggregation queries for leaderboards and reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Every (student, status) pair recorded since `since`, ordered by
    /// student and then oldest-first — the input to leaderboard scoring.
    pub async fn status_rows_since(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<StatusRow>, sqlx::Error> {
        sqlx::query_as::<_, StatusRow>(
            "SELECT student_id, status FROM attendance_records \
             WHERE recorded_at >= $1 \
             ORDER BY student_id, recorded_at ASC",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }

    /// Aggregate status counts over all matching records.
    pub async fn summary(
        pool: &PgPool,
        filters: &ReportFilters,
    ) -> Result<SummaryCounts, sqlx::Error> {
        let query = format!(
            "SELECT {COUNT_COLUMNS} FROM attendance_records ar WHERE {FILTER_CLAUSE}"
        );
        bind_filters(sqlx::query_as::<_, SummaryCounts>(&query), filters)
            .fetch_one(pool)
            .await
    }

    /// Status counts grouped per student.
    pub async fn student_wise(
        pool: &PgPool,
        filters: &ReportFilters,
    ) -> Result<Vec<StudentWiseRow>, sqlx::Error> {
        let query = format!(
            "SELECT ar.student_id, u.full_name AS student_name, {COUNT_COLUMNS} \
             FROM attendance_records ar \
             JOIN users u ON u.id = ar.student_id \
             WHERE {FILTER_CLAUSE} \
             GROUP BY ar.student_id, u.full_name \
             ORDER BY u.full_name ASC"
        );
        bind_filters(sqlx::query_as::<_, StudentWiseRow>(&query), filters)
            .fetch_all(pool)
            .await
    }

    /// Status counts grouped per subject.
    pub async fn subject_wise(
        pool: &PgPool,
        filters: &ReportFilters,
    ) -> Result<Vec<SubjectWiseRow>, sqlx::Error> {
        let query = format!(
            "SELECT ar.subject_id, s.name AS subject_name, s.code AS subject_code, \
                    {COUNT_COLUMNS} \
             FROM attendance_records ar \
             JOIN subjects s ON s.id = ar.subject_id \
             WHERE {FILTER_CLAUSE} \
             GROUP BY ar.subject_id, s.name, s.code \
             ORDER BY s.name ASC"
        );
        bind_filters(sqlx::query_as::<_, SubjectWiseRow>(&query), filters)
            .fetch_all(pool)
            .await
    }

    /// Flattened per-record rows with joined session/subject/student
    /// context, newest first, capped at [`DETAILED_ROW_CAP`].
    pub async fn detailed(
        pool: &PgPool,
        filters: &ReportFilters,
    ) -> Result<Vec<DetailedRow>, sqlx::Error> {
        let query = format!(
            "SELECT ar.id AS record_id, ar.session_id, sess.label AS session_label, \
                    ar.subject_id, s.name AS subject_name, \
                    ar.student_id, u.full_name AS student_name, \
                    ar.status, ar.mode, ar.notes, ar.recorded_at \
             FROM attendance_records ar \
             JOIN attendance_sessions sess ON sess.id = ar.session_id \
             JOIN subjects s ON s.id = ar.subject_id \
             JOIN users u ON u.id = ar.student_id \
             WHERE {FILTER_CLAUSE} \
             ORDER BY ar.recorded_at DESC \
             LIMIT {DETAILED_ROW_CAP}"
        );
        bind_filters(sqlx::query_as::<_, DetailedRow>(&query), filters)
            .fetch_all(pool)
            .await
    }
}

/// Bind the five shared filter parameters in declaration order.
fn bind_filters<'q, T>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, T, sqlx::postgres::PgArguments>,
    filters: &'q ReportFilters,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, T, sqlx::postgres::PgArguments> {
    query
        .bind(filters.subject_id)
        .bind(filters.student_id)
        .bind(filters.session_id)
        .bind(filters.start_date)
        .bind(filters.end_date)
}

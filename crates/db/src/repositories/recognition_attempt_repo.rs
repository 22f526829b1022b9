//! Repository for the append-only `recognition_attempts` audit log.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::recognition::{CreateRecognitionAttempt, RecognitionAttempt};

/// Column list for `recognition_attempts` queries.
const COLUMNS: &str = "id, session_id, student_id, image_ref, accepted, \
    confidence, liveness, quality, confidence_passed, liveness_passed, quality_passed, \
    reason, created_at, updated_at";

/// Provides append and read operations for recognition attempts. Rows are
/// never updated or deleted.
pub struct RecognitionAttemptRepo;

impl RecognitionAttemptRepo {
    /// Append an attempt log row, returning it.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRecognitionAttempt,
    ) -> Result<RecognitionAttempt, sqlx::Error> {
        let query = format!(
            "INSERT INTO recognition_attempts \
                (session_id, student_id, image_ref, accepted, confidence, liveness, quality, \
                 confidence_passed, liveness_passed, quality_passed, reason) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RecognitionAttempt>(&query)
            .bind(input.session_id)
            .bind(input.student_id)
            .bind(&input.image_ref)
            .bind(input.accepted)
            .bind(input.confidence)
            .bind(input.liveness)
            .bind(input.quality)
            .bind(input.confidence_passed)
            .bind(input.liveness_passed)
            .bind(input.quality_passed)
            .bind(&input.reason)
            .fetch_one(pool)
            .await
    }

    /// List attempts for a session, oldest first.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<RecognitionAttempt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM recognition_attempts \
             WHERE session_id = $1 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, RecognitionAttempt>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }
}

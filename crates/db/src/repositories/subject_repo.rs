//! Repository for the `subjects` table.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::subject::{CreateSubject, Subject};

/// Column list for `subjects` queries.
const COLUMNS: &str = "id, name, code, teacher_id, created_at, updated_at";

/// Provides CRUD operations for subjects.
pub struct SubjectRepo;

impl SubjectRepo {
    /// Insert a new subject, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSubject) -> Result<Subject, sqlx::Error> {
        let query = format!(
            "INSERT INTO subjects (name, code, teacher_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .bind(input.teacher_id)
            .fetch_one(pool)
            .await
    }

    /// Find a subject by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subjects WHERE id = $1");
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

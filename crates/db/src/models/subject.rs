//! Subject entity model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subjects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subject {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub teacher_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new subject.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubject {
    pub name: String,
    pub code: String,
    pub teacher_id: DbId,
}

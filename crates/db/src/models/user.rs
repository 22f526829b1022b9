//! User entity model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    /// Argon2id PHC string. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub parent_email: Option<String>,
    pub is_active: bool,
    pub is_approved: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user. `password_hash` must already be hashed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub parent_email: Option<String>,
    /// Defaults to false; students stay off leaderboards until approved.
    pub is_approved: Option<bool>,
}

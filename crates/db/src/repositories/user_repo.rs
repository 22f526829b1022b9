//! Repository for the `users` table.

use rollcall_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, password_hash, full_name, role, parent_email, \
    is_active, is_approved, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, full_name, role, parent_email, is_approved) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, false)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(&input.role)
            .bind(&input.parent_email)
            .bind(input.is_approved)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active user by email (login path).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND is_active = true");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List active, approved students (the leaderboard population).
    pub async fn list_approved_students(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE role = $1 AND is_active = true AND is_approved = true \
             ORDER BY full_name ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(ROLE_STUDENT)
            .fetch_all(pool)
            .await
    }

    /// IDs of all active admin users.
    pub async fn list_admin_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM users WHERE role = $1 AND is_active = true")
            .bind(ROLE_ADMIN)
            .fetch_all(pool)
            .await
    }
}

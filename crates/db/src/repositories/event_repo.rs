//! Repository for the append-only `events` audit table.

use rollcall_core::types::DbId;
use sqlx::PgPool;

/// Provides the insert path for persisted domain events.
pub struct EventRepo;

impl EventRepo {
    /// Insert an event row, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events \
                (event_type, source_entity_type, source_entity_id, actor_user_id, payload) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(event_type)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }
}

//! Durable event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`DomainEvent`] to the
//! `events` table. It runs as a long-lived background task and shuts down
//! gracefully when the bus sender is dropped.

use rollcall_core::types::DbId;
use rollcall_db::repositories::EventRepo;
use rollcall_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::DomainEvent;

/// Background service that persists domain events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and persists
    /// every event it receives. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the `events` table.
    async fn persist(pool: &DbPool, event: &DomainEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(
            pool,
            &event.event_type,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            event.actor_user_id,
            &event.payload,
        )
        .await
    }
}

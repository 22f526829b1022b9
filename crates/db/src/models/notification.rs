//! Notification entity model.

use rollcall_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub event_type: String,
    pub channel: String,
    pub payload: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub is_delivered: bool,
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

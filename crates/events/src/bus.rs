//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`DomainEvent`]s.
//! Mutation handlers publish after their transaction commits; publishing
//! never blocks and never fails the caller. The bus is shared via
//! `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use rollcall_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

/// An attendance record was created or updated (manual or face scan).
pub const EVENT_ATTENDANCE_MARKED: &str = "attendance.marked";

/// A leave request was submitted by a student.
pub const EVENT_LEAVE_SUBMITTED: &str = "leave.submitted";

/// A leave request was approved or rejected.
pub const EVENT_LEAVE_REVIEWED: &str = "leave.reviewed";

/// An attendance session was ended by its teacher. Persisted for audit;
/// no notifications are routed for it.
pub const EVENT_SESSION_ENDED: &str = "session.ended";

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred in the pipeline.
///
/// Constructed via [`DomainEvent::new`] and enriched with the builder
/// methods [`with_source`](DomainEvent::with_source),
/// [`with_actor`](DomainEvent::with_actor), and
/// [`with_payload`](DomainEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"attendance.marked"`.
    pub event_type: String,

    /// Optional source entity kind (e.g. `"attendance_record"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity database id.
    pub source_entity_id: Option<DbId>,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create a new event with only the required `event_type`.
    ///
    /// All optional fields default to `None` / empty object.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DomainEvent`].
///
/// # Usage
///
/// ```rust
/// use rollcall_events::bus::{DomainEvent, EventBus, EVENT_ATTENDANCE_MARKED};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DomainEvent::new(EVENT_ATTENDANCE_MARKED));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    /// The persistence layer (when subscribed) ensures database capture.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Rollcall event bus and notification infrastructure.
//!
//! This crate provides the building blocks that decouple notification
//! fan-out from the mutations that trigger it:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] — the canonical domain event envelope.
//! - [`EventPersistence`] — background service that durably writes every
//!   event to the `events` table.
//! - [`NotificationDispatcher`] — background service that turns events into
//!   notification jobs and delivers each one independently, exactly once.
//! - [`delivery`] — external delivery channels (email, webhook).

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod persistence;

pub use bus::{DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::webhook::WebhookDelivery;
pub use dispatcher::{DispatchSummary, NotificationDispatcher, NotificationJob};
pub use persistence::EventPersistence;

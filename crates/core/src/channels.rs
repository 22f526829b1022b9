//! Well-known notification channel name constants.
//!
//! These must match the channel values stored in the `notifications.channel`
//! column and referenced by the notification dispatcher and API handlers.

/// In-app notification stored as a row for the notification bell UI.
pub const CHANNEL_IN_APP: &str = "in_app";

/// Email notification delivered via SMTP.
pub const CHANNEL_EMAIL: &str = "email";

/// Webhook notification delivered to an external HTTP endpoint.
pub const CHANNEL_WEBHOOK: &str = "webhook";

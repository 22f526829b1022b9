//! Route definitions for in-app notifications.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Notification routes, merged into `/notifications`.
///
/// ```text
/// GET    /                     list_notifications
/// POST   /read-all             mark_all_read
/// GET    /unread-count         unread_count
/// POST   /{id}/read            mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/read-all", post(notification::mark_all_read))
        .route("/unread-count", get(notification::unread_count))
        .route("/{id}/read", post(notification::mark_read))
}

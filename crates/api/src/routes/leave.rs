//! Route definitions for the leave request workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::leave;
use crate::state::AppState;

/// Leave request routes, merged into `/leave-requests`.
///
/// ```text
/// GET    /                     list_requests (role-scoped)
/// POST   /                     submit_request
/// POST   /{request_id}/review  review_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(leave::list_requests).post(leave::submit_request))
        .route("/{request_id}/review", post(leave::review_request))
}

//! Route definitions for attendance sessions, the ledger, and recognition.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{attendance, recognition, session};
use crate::state::AppState;

/// Session routes, merged into `/sessions`.
///
/// ```text
/// GET    /                      list_sessions
/// POST   /                      create_session
/// GET    /{session_id}          get_session
/// POST   /{session_id}/end      end_session
/// POST   /{session_id}/attendance   mark_attendance
/// GET    /{session_id}/records      list_records
/// POST   /{session_id}/recognition  process_attempt
/// GET    /{session_id}/attempts     list_attempts
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(session::list_sessions).post(session::create_session))
        .route("/{session_id}", get(session::get_session))
        .route("/{session_id}/end", post(session::end_session))
        .route(
            "/{session_id}/attendance",
            post(attendance::mark_attendance),
        )
        .route("/{session_id}/records", get(attendance::list_records))
        .route(
            "/{session_id}/recognition",
            post(recognition::process_attempt),
        )
        .route("/{session_id}/attempts", get(recognition::list_attempts))
}

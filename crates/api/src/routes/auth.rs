//! Route definitions for authentication.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Authentication routes, merged into `/auth`.
///
/// ```text
/// POST   /login      login
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(auth::login))
}

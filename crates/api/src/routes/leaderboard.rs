//! Route definitions for the leaderboard.

use axum::routing::get;
use axum::Router;

use crate::handlers::leaderboard;
use crate::state::AppState;

/// Leaderboard routes, merged into `/leaderboard`.
///
/// ```text
/// GET    /      get_leaderboard (?timeframe, ?category)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(leaderboard::get_leaderboard))
}

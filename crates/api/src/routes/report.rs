//! Route definitions for attendance reports.

use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Report routes, merged into `/reports`.
///
/// ```text
/// GET    /      generate_report (?type + filters)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(report::generate_report))
}

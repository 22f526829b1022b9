pub mod auth;
pub mod health;
pub mod leaderboard;
pub mod leave;
pub mod notification;
pub mod report;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
///
/// /sessions                            list, create (teacher)
/// /sessions/{id}                       get (owning teacher or admin)
/// /sessions/{id}/end                   end session, one-way (POST)
/// /sessions/{id}/attendance            mark attendance (POST)
/// /sessions/{id}/records               list attendance records (GET)
/// /sessions/{id}/recognition           process recognition attempt (POST)
/// /sessions/{id}/attempts              list recognition attempts (GET)
///
/// /leave-requests                      list (role-scoped), submit (student)
/// /leave-requests/{id}/review          approve/reject (teacher or admin)
///
/// /leaderboard                         ranked students (?timeframe, ?category)
///
/// /reports                             report object (?type + filters)
///
/// /notifications                       list (?unread_only, limit, offset)
/// /notifications/read-all              mark all read (POST)
/// /notifications/unread-count          unread count (GET)
/// /notifications/{id}/read             mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication (login).
        .nest("/auth", auth::router())
        // Attendance sessions and the ledger/recognition paths under them.
        .nest("/sessions", session::router())
        // Leave request workflow.
        .nest("/leave-requests", leave::router())
        // Leaderboard rankings.
        .nest("/leaderboard", leaderboard::router())
        // Attendance reports.
        .nest("/reports", report::router())
        // In-app notifications.
        .nest("/notifications", notification::router())
}

//! Handler for the leaderboard.
//!
//! Recomputed from the ledger on every call; there is no cached state.
//! The SQL fetches the raw (student, status) rows for the window and the
//! scoring math runs in `rollcall_core`.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use rollcall_core::leaderboard::{score, Category, Timeframe, LEADERBOARD_LIMIT};
use rollcall_core::types::DbId;
use rollcall_db::models::report::LeaderboardEntry;
use rollcall_db::repositories::{ReportRepo, UserRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query params for `GET /leaderboard`.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// `week` (default), `month`, or `semester`.
    pub timeframe: Option<String>,
    /// `attendance` (default), `punctuality`, or `consistency`.
    pub category: Option<String>,
}

/// GET /api/v1/leaderboard
///
/// Rank every approved student by the selected category over the selected
/// trailing window. Students with no records score 0 and stay listed; the
/// response carries at most the top 50.
pub async fn get_leaderboard(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<impl IntoResponse> {
    let timeframe = Timeframe::parse(query.timeframe.as_deref().unwrap_or("week"))?;
    let category = Category::parse(query.category.as_deref().unwrap_or("attendance"))?;

    let since = chrono::Utc::now() - chrono::Duration::days(timeframe.days());

    let students = UserRepo::list_approved_students(&state.pool).await?;
    let rows = ReportRepo::status_rows_since(&state.pool, since).await?;

    // Group statuses per student, preserving the oldest-first row order.
    let mut by_student: HashMap<DbId, Vec<String>> = HashMap::new();
    for row in rows {
        by_student.entry(row.student_id).or_default().push(row.status);
    }

    let mut entries: Vec<LeaderboardEntry> = students
        .into_iter()
        .map(|student| {
            let statuses: Vec<&str> = by_student
                .get(&student.id)
                .map(|s| s.iter().map(String::as_str).collect())
                .unwrap_or_default();
            LeaderboardEntry {
                student_id: student.id,
                full_name: student.full_name,
                score: score(category, &statuses),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.full_name.cmp(&b.full_name)));
    entries.truncate(LEADERBOARD_LIMIT);

    Ok(Json(DataResponse { data: entries }))
}

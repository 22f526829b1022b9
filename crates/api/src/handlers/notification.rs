//! Handlers for in-app notifications.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::repositories::NotificationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for notification listings.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for notification listings.
const MAX_LIMIT: i64 = 200;

/// Query params for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/notifications
///
/// List the caller's notifications, newest first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        auth.user_id,
        query.unread_only,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// POST /api/v1/notifications/{id}/read
///
/// Mark one of the caller's notifications as read.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let updated = NotificationRepo::mark_read(&state.pool, id, auth.user_id).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }));
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({ "id": id, "is_read": true }),
    }))
}

/// POST /api/v1/notifications/read-all
///
/// Mark all of the caller's unread notifications as read.
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: serde_json::json!({ "marked_read": count }),
    }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: serde_json::json!({ "unread_count": count }),
    }))
}

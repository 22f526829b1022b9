//! Handlers for authentication.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use rollcall_core::error::CoreError;
use rollcall_db::models::user::User;
use rollcall_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response payload for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/v1/auth/login
///
/// Verify credentials and issue an access token. The error message is the
/// same for an unknown email and a wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid email or password".into())))?;

    let verified = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !verified {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    let token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(DataResponse {
        data: LoginResponse { token, user },
    }))
}

//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level; per-entity ownership checks live in the
//! [`policy`](crate::policy) module.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rollcall_core::error::CoreError;
use rollcall_core::roles::{ROLE_ADMIN, ROLE_STUDENT, ROLE_TEACHER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `teacher` or `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn teacher_or_admin(RequireTeacher(user): RequireTeacher) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireTeacher(pub AuthUser);

impl FromRequestParts<AppState> for RequireTeacher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_TEACHER {
            return Err(AppError::Core(CoreError::Forbidden(
                "Teacher or Admin role required".into(),
            )));
        }
        Ok(RequireTeacher(user))
    }
}

/// Requires the `student` role. Self-service operations like submitting a
/// leave request belong to students alone.
pub struct RequireStudent(pub AuthUser);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_STUDENT {
            return Err(AppError::Core(CoreError::Forbidden(
                "Student role required".into(),
            )));
        }
        Ok(RequireStudent(user))
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}

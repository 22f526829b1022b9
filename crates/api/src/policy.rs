//! Per-entity capability checks.
//!
//! Role extractors gate by role; these functions gate by ownership, and
//! they are shared by every path that touches the same entity. The manual
//! and recognition attendance paths run the exact same check, so the two
//! can never drift apart.

use rollcall_core::error::CoreError;
use rollcall_core::roles::{ROLE_ADMIN, ROLE_TEACHER};
use rollcall_core::types::DbId;
use rollcall_db::models::leave::LeaveRequest;
use rollcall_db::models::session::AttendanceSession;

use crate::middleware::auth::AuthUser;

/// Only the teacher who created a session may mutate it (end it, process
/// recognition attempts).
pub fn ensure_owns_session(user: &AuthUser, session: &AttendanceSession) -> Result<(), CoreError> {
    if session.teacher_id == user.user_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the owning teacher can manage this session".into(),
        ))
    }
}

/// The owning teacher or an admin may read a session and its records.
pub fn ensure_can_view_session(
    user: &AuthUser,
    session: &AttendanceSession,
) -> Result<(), CoreError> {
    if user.role == ROLE_ADMIN || session.teacher_id == user.user_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the owning teacher or an admin can view this session".into(),
        ))
    }
}

/// Attendance may be marked by the owning teacher, or by a student marking
/// their own attendance, never someone else's.
pub fn ensure_can_mark(
    user: &AuthUser,
    session: &AttendanceSession,
    student_id: DbId,
) -> Result<(), CoreError> {
    if session.teacher_id == user.user_id || user.user_id == student_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the owning teacher or the student themself can mark attendance".into(),
        ))
    }
}

/// A leave request may be reviewed by an admin, or by the teacher it is
/// addressed to. A request with no addressed teacher is admin-only.
pub fn ensure_can_review(user: &AuthUser, request: &LeaveRequest) -> Result<(), CoreError> {
    if user.role == ROLE_ADMIN {
        return Ok(());
    }
    if user.role == ROLE_TEACHER && request.teacher_id == Some(user.user_id) {
        return Ok(());
    }
    Err(CoreError::Forbidden(
        "Only the addressed teacher or an admin can review this request".into(),
    ))
}

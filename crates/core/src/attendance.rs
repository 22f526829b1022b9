//! Attendance status and mode constants with validation helpers.
//!
//! Defines the valid values for `attendance_records.status`,
//! `attendance_records.mode`, and `attendance_sessions.mode`, used by both
//! the DB and API layers.

use crate::error::CoreError;

/// Student was present during the session.
pub const STATUS_PRESENT: &str = "present";

/// Student was absent.
pub const STATUS_ABSENT: &str = "absent";

/// Student arrived late.
pub const STATUS_LATE: &str = "late";

/// Student was on an approved leave. Stored as-is, never remapped to
/// `absent` (the aggregation layer decides how to count it).
pub const STATUS_ON_LEAVE: &str = "on_leave";

/// All valid attendance record statuses.
pub const VALID_STATUSES: &[&str] =
    &[STATUS_PRESENT, STATUS_ABSENT, STATUS_LATE, STATUS_ON_LEAVE];

/// Record was entered by hand (teacher roster or student self-marking).
pub const MODE_MANUAL: &str = "manual";

/// Record was produced by an accepted recognition attempt.
pub const MODE_FACE_SCAN: &str = "face_scan";

/// All valid attendance record modes.
pub const VALID_RECORD_MODES: &[&str] = &[MODE_MANUAL, MODE_FACE_SCAN];

/// Session accepts manual marking only.
pub const SESSION_MODE_MANUAL: &str = "manual";

/// Session accepts recognition attempts in addition to manual marking.
pub const SESSION_MODE_AUTO: &str = "auto_recognition";

/// All valid session modes.
pub const VALID_SESSION_MODES: &[&str] = &[SESSION_MODE_MANUAL, SESSION_MODE_AUTO];

/// Validate that a status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid attendance status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Validate that a record mode string is one of the accepted values.
pub fn validate_record_mode(mode: &str) -> Result<(), CoreError> {
    if VALID_RECORD_MODES.contains(&mode) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid attendance mode '{mode}'. Must be one of: {}",
            VALID_RECORD_MODES.join(", ")
        )))
    }
}

/// Validate that a session mode string is one of the accepted values.
pub fn validate_session_mode(mode: &str) -> Result<(), CoreError> {
    if VALID_SESSION_MODES.contains(&mode) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid session mode '{mode}'. Must be one of: {}",
            VALID_SESSION_MODES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_statuses_accepted() {
        for status in VALID_STATUSES {
            assert!(validate_status(status).is_ok());
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        let result = validate_status("excused");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid attendance status"));
    }

    #[test]
    fn test_empty_status_rejected() {
        assert!(validate_status("").is_err());
    }

    #[test]
    fn test_on_leave_is_a_distinct_status() {
        // `on_leave` must survive validation as its own value; it is never
        // folded into `absent` anywhere in the pipeline.
        assert!(validate_status(STATUS_ON_LEAVE).is_ok());
        assert_ne!(STATUS_ON_LEAVE, STATUS_ABSENT);
    }

    #[test]
    fn test_record_modes() {
        assert!(validate_record_mode(MODE_MANUAL).is_ok());
        assert!(validate_record_mode(MODE_FACE_SCAN).is_ok());
        assert!(validate_record_mode("auto").is_err());
    }

    #[test]
    fn test_session_modes() {
        assert!(validate_session_mode(SESSION_MODE_MANUAL).is_ok());
        assert!(validate_session_mode(SESSION_MODE_AUTO).is_ok());
        assert!(validate_session_mode("face_scan").is_err());
    }
}

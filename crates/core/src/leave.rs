//! Leave request status constants and validation helpers.
//!
//! A leave request starts `pending` and transitions exactly once, to either
//! `approved` or `rejected`. Both outcomes are terminal; the DB layer guards
//! the transition with `AND status = 'pending'` so the invariant holds even
//! under concurrent reviews.

use chrono::NaiveDate;

use crate::error::CoreError;

/// Request has been submitted and awaits review.
pub const STATUS_PENDING: &str = "pending";

/// Request was approved by a teacher or admin. Terminal.
pub const STATUS_APPROVED: &str = "approved";

/// Request was rejected by a teacher or admin. Terminal.
pub const STATUS_REJECTED: &str = "rejected";

/// Decisions a reviewer may record.
pub const VALID_DECISIONS: &[&str] = &[STATUS_APPROVED, STATUS_REJECTED];

/// Validate that a review decision is one of the accepted values.
pub fn validate_decision(decision: &str) -> Result<(), CoreError> {
    if VALID_DECISIONS.contains(&decision) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid decision '{decision}'. Must be one of: {}",
            VALID_DECISIONS.join(", ")
        )))
    }
}

/// Validate a leave date range. The end date must fall strictly after the
/// start date.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), CoreError> {
    if end_date <= start_date {
        return Err(CoreError::Validation(
            "Leave end date must be after the start date".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a submitted reason is non-empty after trimming.
pub fn validate_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation(
            "Leave reason must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_valid_decisions_accepted() {
        assert!(validate_decision(STATUS_APPROVED).is_ok());
        assert!(validate_decision(STATUS_REJECTED).is_ok());
    }

    #[test]
    fn test_pending_is_not_a_decision() {
        assert!(validate_decision(STATUS_PENDING).is_err());
    }

    #[test]
    fn test_unknown_decision_rejected() {
        let result = validate_decision("maybe");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid decision"));
    }

    #[test]
    fn test_forward_date_range_accepted() {
        assert!(validate_date_range(date("2025-01-10"), date("2025-01-12")).is_ok());
    }

    #[test]
    fn test_equal_dates_rejected() {
        assert!(validate_date_range(date("2025-01-10"), date("2025-01-10")).is_err());
    }

    #[test]
    fn test_inverted_date_range_rejected() {
        let result = validate_date_range(date("2025-01-12"), date("2025-01-10"));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("end date must be after"));
    }

    #[test]
    fn test_blank_reason_rejected() {
        assert!(validate_reason("   ").is_err());
        assert!(validate_reason("Medical").is_ok());
    }
}

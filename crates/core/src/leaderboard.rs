//! Leaderboard scoring.
//!
//! Pure scoring math over a student's attendance statuses within a
//! timeframe window. The DB layer fetches each student's statuses ordered
//! oldest-first; everything else happens here so the arithmetic is testable
//! without a database.

use crate::attendance::{STATUS_LATE, STATUS_PRESENT};
use crate::error::CoreError;

/// Maximum number of entries a leaderboard response carries.
pub const LEADERBOARD_LIMIT: usize = 50;

/// The consistency category scores only the most recent records in the
/// window, up to this many.
pub const CONSISTENCY_WINDOW: usize = 10;

/// Leaderboard timeframe, expressed as a trailing window in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Week,
    Month,
    Semester,
}

impl Timeframe {
    /// Parse a query-string value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "semester" => Ok(Self::Semester),
            other => Err(CoreError::Validation(format!(
                "Invalid timeframe '{other}'. Must be one of: week, month, semester"
            ))),
        }
    }

    /// Length of the trailing window in days.
    pub fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Semester => 180,
        }
    }
}

/// Leaderboard scoring category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `round(100 × (present + late) / total)`.
    Attendance,
    /// `round(100 × present / total)` — late arrivals do not count.
    Punctuality,
    /// Attendance restricted to the last [`CONSISTENCY_WINDOW`] records.
    Consistency,
}

impl Category {
    /// Parse a query-string value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "attendance" => Ok(Self::Attendance),
            "punctuality" => Ok(Self::Punctuality),
            "consistency" => Ok(Self::Consistency),
            other => Err(CoreError::Validation(format!(
                "Invalid category '{other}'. Must be one of: attendance, punctuality, consistency"
            ))),
        }
    }
}

/// Score a student's statuses (ordered oldest-first) for a category.
///
/// Returns an integer in `[0, 100]`. A student with no records scores 0.
pub fn score(category: Category, statuses: &[&str]) -> i64 {
    let window: &[&str] = match category {
        Category::Consistency => {
            let skip = statuses.len().saturating_sub(CONSISTENCY_WINDOW);
            &statuses[skip..]
        }
        _ => statuses,
    };

    if window.is_empty() {
        return 0;
    }

    let counted = window
        .iter()
        .filter(|s| match category {
            Category::Punctuality => **s == STATUS_PRESENT,
            _ => **s == STATUS_PRESENT || **s == STATUS_LATE,
        })
        .count();

    (100.0 * counted as f64 / window.len() as f64).round() as i64
}

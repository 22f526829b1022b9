//! Report type parsing and shared rate arithmetic.

use crate::error::CoreError;

/// Supported report shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    /// One aggregate object over every matching record.
    Summary,
    /// Flattened per-record rows with session/subject/student context.
    Detailed,
    /// Aggregates grouped per student.
    StudentWise,
    /// Aggregates grouped per subject.
    SubjectWise,
}

impl ReportType {
    /// Parse a query-string value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "summary" => Ok(Self::Summary),
            "detailed" => Ok(Self::Detailed),
            "student_wise" => Ok(Self::StudentWise),
            "subject_wise" => Ok(Self::SubjectWise),
            other => Err(CoreError::Validation(format!(
                "Invalid report type '{other}'. Must be one of: \
                 summary, detailed, student_wise, subject_wise"
            ))),
        }
    }
}

/// Attendance rate as a percentage with two decimal places:
/// `round2(100 × (present + late) / total)`. Zero records rate 0.
pub fn attendance_rate(present: i64, late: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(100.0 * (present + late) as f64 / total as f64)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_type_parse() {
        assert_eq!(ReportType::parse("summary").unwrap(), ReportType::Summary);
        assert_eq!(
            ReportType::parse("student_wise").unwrap(),
            ReportType::StudentWise
        );
        assert!(ReportType::parse("weekly").is_err());
    }

    #[test]
    fn test_rate_counts_present_and_late() {
        assert_eq!(attendance_rate(2, 1, 4), 75.0);
    }

    #[test]
    fn test_rate_two_decimal_rounding() {
        // 2 of 3 = 66.666… → 66.67.
        assert_eq!(attendance_rate(2, 0, 3), 66.67);
        // 1 of 3 = 33.333… → 33.33.
        assert_eq!(attendance_rate(1, 0, 3), 33.33);
    }

    #[test]
    fn test_rate_with_no_records_is_zero() {
        assert_eq!(attendance_rate(0, 0, 0), 0.0);
    }
}

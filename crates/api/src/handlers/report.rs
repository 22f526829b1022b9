//! Handler for attendance reports.
//!
//! Every report is recomputed on demand from the ledger. Rates are
//! percentages with two decimal places, counting `present` and `late` as
//! attended.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use rollcall_core::reports::{attendance_rate, ReportType};
use rollcall_core::types::DbId;
use rollcall_db::models::report::{
    DetailedRow, ReportFilters, StudentWiseRow, SubjectWiseRow, SummaryCounts,
};
use rollcall_db::repositories::ReportRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query params for `GET /reports`.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// `summary` (default), `detailed`, `student_wise`, or `subject_wise`.
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub subject_id: Option<DbId>,
    pub student_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

impl ReportQuery {
    fn filters(&self) -> ReportFilters {
        ReportFilters {
            subject_id: self.subject_id,
            student_id: self.student_id,
            session_id: self.session_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// One aggregate object over every matching record.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    #[serde(flatten)]
    pub counts: SummaryCounts,
    pub attendance_rate: f64,
}

/// Per-student aggregate with its rate.
#[derive(Debug, Serialize)]
pub struct StudentWiseReportRow {
    #[serde(flatten)]
    pub row: StudentWiseRow,
    pub attendance_rate: f64,
}

/// Per-subject aggregate with its rate.
#[derive(Debug, Serialize)]
pub struct SubjectWiseReportRow {
    #[serde(flatten)]
    pub row: SubjectWiseRow,
    pub attendance_rate: f64,
}

/// Detailed report: flattened rows plus the overall summary.
#[derive(Debug, Serialize)]
pub struct DetailedReport {
    pub summary: SummaryReport,
    pub rows: Vec<DetailedRow>,
}

/// GET /api/v1/reports
///
/// Generate a report over the ledger. Open to any authenticated user.
pub async fn generate_report(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let report_type = ReportType::parse(query.report_type.as_deref().unwrap_or("summary"))?;
    let filters = query.filters();

    let response = match report_type {
        ReportType::Summary => {
            let counts = ReportRepo::summary(&state.pool, &filters).await?;
            Json(DataResponse {
                data: summarize(counts),
            })
            .into_response()
        }
        ReportType::Detailed => {
            let counts = ReportRepo::summary(&state.pool, &filters).await?;
            let rows = ReportRepo::detailed(&state.pool, &filters).await?;
            Json(DataResponse {
                data: DetailedReport {
                    summary: summarize(counts),
                    rows,
                },
            })
            .into_response()
        }
        ReportType::StudentWise => {
            let rows = ReportRepo::student_wise(&state.pool, &filters).await?;
            let rows: Vec<StudentWiseReportRow> = rows
                .into_iter()
                .map(|row| StudentWiseReportRow {
                    attendance_rate: attendance_rate(row.present, row.late, row.total),
                    row,
                })
                .collect();
            Json(DataResponse { data: rows }).into_response()
        }
        ReportType::SubjectWise => {
            let rows = ReportRepo::subject_wise(&state.pool, &filters).await?;
            let rows: Vec<SubjectWiseReportRow> = rows
                .into_iter()
                .map(|row| SubjectWiseReportRow {
                    attendance_rate: attendance_rate(row.present, row.late, row.total),
                    row,
                })
                .collect();
            Json(DataResponse { data: rows }).into_response()
        }
    };

    Ok(response)
}

fn summarize(counts: SummaryCounts) -> SummaryReport {
    SummaryReport {
        attendance_rate: attendance_rate(counts.present, counts.late, counts.total),
        counts,
    }
}

//! Reporting handlers for the sales report and its CSV export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::error::AppResult;
use crate::services::reporting::{
    build_sales_table, resolve_range, sales_report, ReportingService, SalesReportParams,
};
use crate::AppState;

/// Sales report as JSON, or as a CSV download with `format=csv`
pub async fn get_sales_report(
    State(state): State<AppState>,
    Query(params): Query<SalesReportParams>,
) -> AppResult<Response> {
    let range = resolve_range(
        &params,
        Utc::now().date_naive(),
        state.config.reporting.default_range_days,
    )?;

    // Reject bad sort/hidden keys before going to the database
    let mut table = build_sales_table(Vec::new(), range, &params)?;

    let service = ReportingService::new(state.db.clone());
    table.set_rows(service.sales_rows(range).await?);

    if params.format.as_deref() == Some("csv") {
        let csv = table.export_csv()?;
        let disposition = format!(
            "attachment; filename=\"sales_report_{}_{}.csv\"",
            range.start, range.end
        );
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(sales_report(&table, range)).into_response())
}

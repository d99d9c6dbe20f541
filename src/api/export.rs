use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use sqlx::MySqlPool;
use tracing::error;

use crate::api::time_record::{TimeRecordQuery, fetch_report_rows};

const EXPORT_HEADERS: [&str; 10] = [
    "id",
    "employee_id",
    "employee_name",
    "date",
    "check_in",
    "break_seconds",
    "check_out",
    "worked_hours",
    "lateness",
    "overtime",
];

/// Export time records as CSV
///
/// Same filters as the list endpoint, no pagination; metrics are rounded to
/// 2 decimal places like every other report surface.
#[utoipa::path(
    get,
    path = "/api/v1/time-records/export",
    params(TimeRecordQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "TimeRecord"
)]
pub async fn export_time_records(
    pool: web::Data<MySqlPool>,
    query: web::Query<TimeRecordQuery>,
) -> actix_web::Result<impl Responder> {
    let rows = fetch_report_rows(pool.get_ref(), &query)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch time records for export");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| {
            error!(error = %e, "Failed to write CSV header");
            ErrorInternalServerError("Internal Server Error")
        })?;

    for row in rows {
        let (worked_hours, lateness, overtime) = row.metrics();

        writer
            .write_record([
                row.id.to_string(),
                row.employee_id.to_string(),
                row.employee_name.clone(),
                row.date.to_string(),
                row.check_in
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default(),
                row.break_seconds
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                row.check_out
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default(),
                format!("{:.2}", worked_hours),
                format!("{:.2}", lateness),
                format!("{:.2}", overtime),
            ])
            .map_err(|e| {
                error!(error = %e, "Failed to write CSV row");
                ErrorInternalServerError("Internal Server Error")
            })?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        error!(error = %e, "Failed to finish CSV export");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"time_records.csv\"",
        ))
        .body(bytes))
}

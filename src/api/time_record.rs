use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::{
    core::metrics::{lateness, overtime, round_hours, worked_hours},
    model::time_record::TimeRecord,
    utils::db_utils::{build_update_sql, execute_update},
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct TimeRecordQuery {
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 20)]
    /// Pagination per page number
    pub per_page: Option<u32>,
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    /// Filter by the employee's company
    pub company_id: Option<u64>,
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    /// Earliest date, inclusive
    pub from: Option<NaiveDate>,
    #[schema(example = "2024-06-30", format = "date", value_type = String)]
    /// Latest date, inclusive
    pub to: Option<NaiveDate>,
}

/// A time record joined with its employee's name and standard schedule,
/// which the metrics need at calculation time.
#[derive(sqlx::FromRow)]
pub(crate) struct ReportRow {
    pub id: u64,
    pub employee_id: u64,
    pub employee_name: String,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub break_seconds: Option<i64>,
    pub check_out: Option<NaiveTime>,
    pub standard_check_in: NaiveTime,
    pub standard_check_out: NaiveTime,
}

impl ReportRow {
    fn record(&self) -> TimeRecord {
        TimeRecord {
            id: self.id,
            employee_id: self.employee_id,
            date: self.date,
            check_in: self.check_in,
            break_seconds: self.break_seconds,
            check_out: self.check_out,
        }
    }

    /// (worked_hours, lateness, overtime), each rounded to 2 decimals.
    pub(crate) fn metrics(&self) -> (f64, f64, f64) {
        let record = self.record();
        (
            round_hours(worked_hours(&record)),
            round_hours(lateness(&record, self.standard_check_in)),
            round_hours(overtime(&record, self.standard_check_out)),
        )
    }
}

#[derive(Serialize, ToSchema)]
pub struct TimeRecordResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 123)]
    pub employee_id: u64,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", format = "time", value_type = String)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = 3600)]
    pub break_seconds: Option<i64>,
    #[schema(example = "18:00:00", format = "time", value_type = String)]
    pub check_out: Option<NaiveTime>,
    #[schema(example = 8.0)]
    pub worked_hours: f64,
    #[schema(example = 0.5)]
    pub lateness: f64,
    #[schema(example = 1.0)]
    pub overtime: f64,
}

impl From<ReportRow> for TimeRecordResponse {
    fn from(row: ReportRow) -> Self {
        let (worked_hours, lateness, overtime) = row.metrics();
        TimeRecordResponse {
            id: row.id,
            employee_id: row.employee_id,
            employee_name: row.employee_name,
            date: row.date,
            check_in: row.check_in,
            break_seconds: row.break_seconds,
            check_out: row.check_out,
            worked_hours,
            lateness,
            overtime,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TimeRecordListResponse {
    pub data: Vec<TimeRecordResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 57)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

fn build_where(query: &TimeRecordQuery) -> (String, Vec<FilterValue>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND tr.employee_id = ?");
        args.push(FilterValue::U64(employee_id));
    }

    if let Some(company_id) = query.company_id {
        where_sql.push_str(" AND e.company_id = ?");
        args.push(FilterValue::U64(company_id));
    }

    if let Some(from) = query.from {
        where_sql.push_str(" AND tr.date >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        where_sql.push_str(" AND tr.date <= ?");
        args.push(FilterValue::Date(to));
    }

    (where_sql, args)
}

const REPORT_SELECT: &str = r#"
    SELECT
        tr.id,
        tr.employee_id,
        e.name AS employee_name,
        tr.date,
        tr.check_in,
        tr.break_seconds,
        tr.check_out,
        e.standard_check_in,
        e.standard_check_out
    FROM time_records tr
    JOIN employees e ON e.id = tr.employee_id
"#;

/// Fetch every matching row, unpaginated. The export endpoint shares this.
pub(crate) async fn fetch_report_rows(
    pool: &MySqlPool,
    query: &TimeRecordQuery,
) -> Result<Vec<ReportRow>, sqlx::Error> {
    let (where_sql, args) = build_where(query);
    let sql = format!("{}{} ORDER BY tr.date DESC, tr.id DESC", REPORT_SELECT, where_sql);

    let mut q = sqlx::query_as::<_, ReportRow>(&sql);
    for arg in &args {
        q = match arg {
            FilterValue::U64(v) => q.bind(*v),
            FilterValue::Date(d) => q.bind(*d),
        };
    }

    q.fetch_all(pool).await
}

/// Paginated time record list with computed metrics
#[utoipa::path(
    get,
    path = "/api/v1/time-records",
    params(TimeRecordQuery),
    responses(
        (status = 200, description = "Paginated time record list", body = TimeRecordListResponse)
    ),
    tag = "TimeRecord"
)]
pub async fn list_time_records(
    pool: web::Data<MySqlPool>,
    query: web::Query<TimeRecordQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let (where_sql, args) = build_where(&query);

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!(
        "SELECT COUNT(*) FROM time_records tr JOIN employees e ON e.id = tr.employee_id{}",
        where_sql
    );
    debug!(sql = %count_sql, "Counting time records");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count time records");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        "{}{} ORDER BY tr.date DESC, tr.id DESC LIMIT ? OFFSET ?",
        REPORT_SELECT, where_sql
    );

    let mut data_q = sqlx::query_as::<_, ReportRow>(&data_sql);
    for arg in &args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(*v),
            FilterValue::Date(d) => data_q.bind(*d),
        };
    }

    let rows = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch time records");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(TimeRecordListResponse {
        data: rows.into_iter().map(TimeRecordResponse::from).collect(),
        page,
        per_page,
        total,
    }))
}

/// Get a time record by ID, with computed metrics
#[utoipa::path(
    get,
    path = "/api/v1/time-records/{record_id}",
    params(
        ("record_id", Path, description = "Time record ID")
    ),
    responses(
        (status = 200, description = "Time record found", body = TimeRecordResponse),
        (status = 404, description = "Time record not found", body = Object, example = json!({
            "message": "Time record not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "TimeRecord"
)]
pub async fn get_time_record(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();

    let sql = format!("{} WHERE tr.id = ?", REPORT_SELECT);
    let row = sqlx::query_as::<_, ReportRow>(&sql)
        .bind(record_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, record_id, "Failed to fetch time record");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match row {
        Some(row) => Ok(HttpResponse::Ok().json(TimeRecordResponse::from(row))),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Time record not found"
        }))),
    }
}

/// Update a time record (administrative correction)
#[utoipa::path(
    put,
    path = "/api/v1/time-records/{record_id}",
    params(
        ("record_id", Path, description = "Time record ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Time record updated successfully"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Time record not found"),
        (status = 409, description = "A record already exists for that employee and date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "TimeRecord"
)]
pub async fn update_time_record(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();

    let update = build_update_sql("time_records", &body, "id", record_id)?;

    let affected = match execute_update(pool.get_ref(), update).await {
        Ok(affected) => affected,
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "A record already exists for that employee and date"
                    })));
                }
            }
            error!(error = %e, record_id, "Failed to update time record");
            return Err(ErrorInternalServerError("Internal Server Error"));
        }
    };

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Time record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Time record updated successfully"
    })))
}

/// Delete a time record
#[utoipa::path(
    delete,
    path = "/api/v1/time-records/{record_id}",
    params(
        ("record_id", Path, description = "Time record ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Time record not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "TimeRecord"
)]
pub async fn delete_time_record(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();

    let result = sqlx::query("DELETE FROM time_records WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Time record not found"
                })));
            }

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }

        Err(e) => {
            error!(error = %e, record_id, "Failed to delete time record");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    fn row() -> ReportRow {
        ReportRow {
            id: 1,
            employee_id: 42,
            employee_name: "John Doe".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            check_in: Some(t(9, 30)),
            break_seconds: Some(1500),
            check_out: Some(t(19, 0)),
            standard_check_in: t(9, 0),
            standard_check_out: t(18, 0),
        }
    }

    #[test]
    fn metrics_are_rounded_to_two_decimals() {
        // span 9.5h minus a 25 min break = 9.0833... -> 9.08
        let (worked, late, over) = row().metrics();
        assert_eq!(worked, 9.08);
        assert_eq!(late, 0.5);
        assert_eq!(over, 1.0);
    }

    #[test]
    fn response_carries_metrics_and_identity() {
        let resp = TimeRecordResponse::from(row());
        assert_eq!(resp.employee_name, "John Doe");
        assert_eq!(resp.worked_hours, 9.08);
        assert_eq!(resp.break_seconds, Some(1500));
    }
}

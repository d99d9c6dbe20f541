use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::core::punch::{self, PunchAction, PunchError};
use crate::model::time_record::TimeRecord;
use crate::utils::code_cache::{self, CachedEmployee};
use crate::utils::code_filter;

#[derive(Deserialize, ToSchema)]
pub struct PunchRequest {
    #[schema(example = "482913")]
    pub auth_code: String,
    #[schema(example = "check_in")]
    pub action: PunchAction,
}

#[derive(Serialize, ToSchema)]
pub struct PunchResponse {
    #[schema(example = "Action check_in completed for John Doe")]
    pub message: String,
    /// `success` or `danger`, the severity the terminal UI renders with.
    #[schema(example = "success")]
    pub message_type: String,
}

fn success(message: String) -> HttpResponse {
    HttpResponse::Ok().json(PunchResponse {
        message,
        message_type: "success".to_string(),
    })
}

fn danger(status: actix_web::http::StatusCode, error: &PunchError) -> HttpResponse {
    HttpResponse::build(status).json(PunchResponse {
        message: error.to_string(),
        message_type: "danger".to_string(),
    })
}

/// Resolve an auth code to an employee: cuckoo filter fast negative,
/// then cache, then database.
async fn resolve_employee(pool: &MySqlPool, code: &str) -> Result<CachedEmployee, PunchError> {
    // 1️⃣ Cuckoo filter — a miss means the code cannot exist, skip the DB
    if !code_filter::might_exist(code) {
        return Err(PunchError::EmployeeNotFound);
    }

    // 2️⃣ Moka cache — fast positive
    if let Some(employee) = code_cache::get(code).await {
        return Ok(employee);
    }

    // 3️⃣ Database fallback
    let employee =
        sqlx::query_as::<_, CachedEmployee>("SELECT id, name FROM employees WHERE auth_code = ?")
            .bind(code)
            .fetch_optional(pool)
            .await
            .map_err(|e| PunchError::Internal(e.to_string()))?
            .ok_or(PunchError::EmployeeNotFound)?;

    code_cache::put(code, employee.clone()).await;
    Ok(employee)
}

/// Get-or-create today's record for the employee. The insert is keyed on
/// the (employee_id, date) unique index, so a concurrent first punch still
/// ends up with one row. The created row outlives a rejected action.
async fn today_record(
    pool: &MySqlPool,
    employee_id: u64,
    date: chrono::NaiveDate,
) -> Result<TimeRecord, PunchError> {
    sqlx::query("INSERT IGNORE INTO time_records (employee_id, date) VALUES (?, ?)")
        .bind(employee_id)
        .bind(date)
        .execute(pool)
        .await
        .map_err(|e| PunchError::Internal(e.to_string()))?;

    sqlx::query_as::<_, TimeRecord>(
        r#"
        SELECT id, employee_id, date, check_in, break_seconds, check_out
        FROM time_records
        WHERE employee_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_one(pool)
    .await
    .map_err(|e| PunchError::Internal(e.to_string()))
}

async fn persist_punch(pool: &MySqlPool, record: &TimeRecord) -> Result<(), PunchError> {
    sqlx::query(
        r#"
        UPDATE time_records
        SET check_in = ?, break_seconds = ?, check_out = ?
        WHERE id = ?
        "#,
    )
    .bind(record.check_in)
    .bind(record.break_seconds)
    .bind(record.check_out)
    .bind(record.id)
    .execute(pool)
    .await
    .map_err(|e| PunchError::Internal(e.to_string()))?;

    Ok(())
}

/// Punch endpoint: employees present their 6-digit code plus an action
#[utoipa::path(
    post,
    path = "/punch",
    request_body = PunchRequest,
    responses(
        (status = 200, description = "Action applied", body = PunchResponse, example = json!({
            "message": "Action check_in completed for John Doe",
            "message_type": "success"
        })),
        (status = 400, description = "Invalid or duplicate action", body = PunchResponse, example = json!({
            "message": "Invalid or duplicate action",
            "message_type": "danger"
        })),
        (status = 404, description = "Unknown auth code", body = PunchResponse, example = json!({
            "message": "Invalid authentication code",
            "message_type": "danger"
        })),
        (status = 500, description = "Internal server error", body = PunchResponse)
    ),
    tag = "Punch"
)]
pub async fn punch(
    pool: web::Data<MySqlPool>,
    payload: web::Json<PunchRequest>,
) -> actix_web::Result<impl Responder> {
    let code = payload.auth_code.trim();
    let action = payload.action;

    let employee = match resolve_employee(pool.get_ref(), code).await {
        Ok(employee) => employee,
        Err(e @ PunchError::EmployeeNotFound) => {
            // No record is created on a failed lookup
            return Ok(danger(actix_web::http::StatusCode::NOT_FOUND, &e));
        }
        Err(e) => {
            tracing::error!(error = %e, "Auth code lookup failed");
            return Ok(danger(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, &e));
        }
    };

    // The uniqueness key day is the server's current date, never the caller's
    let now = Local::now().naive_local();

    let mut record = match today_record(pool.get_ref(), employee.id, now.date()).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(error = %e, employee_id = employee.id, "Fetching today's record failed");
            return Ok(danger(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, &e));
        }
    };

    match punch::apply(&mut record, action, now) {
        Ok(()) => {}
        Err(e @ PunchError::InvalidTransition) => {
            // The get-or-create row stays; only punch fields are untouched
            return Ok(danger(actix_web::http::StatusCode::BAD_REQUEST, &e));
        }
        Err(e) => {
            return Ok(danger(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, &e));
        }
    }

    if let Err(e) = persist_punch(pool.get_ref(), &record).await {
        tracing::error!(error = %e, record_id = record.id, "Persisting punch failed");
        return Ok(danger(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, &e));
    }

    Ok(success(format!(
        "Action {} completed for {}",
        action, employee.name
    )))
}

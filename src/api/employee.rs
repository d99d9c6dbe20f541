use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::{
    model::employee::Employee,
    utils::{
        code_cache::{self, CachedEmployee},
        code_filter,
        db_utils::{build_update_sql, execute_update},
    },
};

/// Insert attempts before giving up on code allocation. Collisions are rare
/// (1M code space) so more than a couple of retries means something is wrong.
const MAX_CODE_ATTEMPTS: u32 = 10;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@email.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = 1, value_type = u64)]
    pub company_id: u64,
    #[schema(example = "09:00:00", format = "time", value_type = String)]
    pub standard_check_in: NaiveTime,
    #[schema(example = "18:00:00", format = "time", value_type = String)]
    pub standard_check_out: NaiveTime,
    /// 6 digits; generated automatically when absent.
    #[schema(example = "482913")]
    pub auth_code: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub company_id: Option<u64>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// A fresh 6-digit numeric code, zero-padded ("000000" is valid).
pub(crate) fn generate_auth_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
}

fn is_valid_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

/// Create Employee
///
/// The lookup code is allocated atomically: generate, insert, and retry on a
/// duplicate-key conflict rather than check-then-write.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid payload", body = Object, example = json!({
            "message": "auth_code must be exactly 6 digits"
        })),
        (status = 409, description = "Email or auth code already exists", body = Object, example = json!({
            "message": "Email already exists"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "name must not be empty"
        })));
    }

    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "A valid email is required"
        })));
    }

    if let Some(code) = payload.auth_code.as_deref() {
        if !is_valid_code(code.trim()) {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "auth_code must be exactly 6 digits"
            })));
        }
    }
    let caller_supplied = payload.auth_code.is_some();

    for _attempt in 0..MAX_CODE_ATTEMPTS {
        let code = match payload.auth_code.as_deref() {
            Some(code) => code.trim().to_string(),
            None => {
                let code = generate_auth_code();
                // cheap pre-check; the unique key still has the final word
                if code_filter::might_exist(&code) {
                    continue;
                }
                code
            }
        };

        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (name, email, company_id, standard_check_in, standard_check_out, auth_code)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(payload.company_id)
        .bind(payload.standard_check_in)
        .bind(payload.standard_check_out)
        .bind(&code)
        .execute(pool.get_ref())
        .await;

        match result {
            Ok(res) => {
                let id = res.last_insert_id();
                code_filter::insert(&code);
                code_cache::put(
                    &code,
                    CachedEmployee {
                        id,
                        name: name.to_string(),
                    },
                )
                .await;

                return Ok(HttpResponse::Created().json(Employee {
                    id,
                    name: name.to_string(),
                    email: email.to_string(),
                    company_id: payload.company_id,
                    standard_check_in: payload.standard_check_in,
                    standard_check_out: payload.standard_check_out,
                    auth_code: code,
                }));
            }
            Err(e) => {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code().as_deref() == Some("23000") {
                        let detail = db_err.message();

                        if detail.contains("uq_employees_email") {
                            return Ok(HttpResponse::Conflict().json(json!({
                                "message": "Email already exists"
                            })));
                        }

                        if detail.contains("uq_employees_auth_code") {
                            if caller_supplied {
                                return Ok(HttpResponse::Conflict().json(json!({
                                    "message": "Auth code already exists"
                                })));
                            }
                            // generated code collided, roll again
                            continue;
                        }

                        if detail.contains("foreign key") {
                            return Ok(HttpResponse::BadRequest().json(json!({
                                "message": "Unknown company"
                            })));
                        }
                    }
                }

                error!(error = %e, "Failed to create employee");
                return Ok(HttpResponse::InternalServerError().json(json!({
                    "message": "Something went wrong, Contact with system admin"
                })));
            }
        }
    }

    error!("Auth code allocation exhausted {} attempts", MAX_CODE_ATTEMPTS);
    Ok(HttpResponse::InternalServerError().json(json!({
        "message": "Could not allocate a unique auth code"
    })))
}

/// Paginated employee list
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(company_id) = query.company_id {
        where_sql.push_str(" AND company_id = ?");
        args.push(FilterValue::U64(company_id));
    }

    let like;
    if let Some(search) = query.search.as_deref() {
        where_sql.push_str(" AND (name LIKE ? OR email LIKE ?)");
        like = format!("%{}%", search);
        args.push(FilterValue::Str(&like));
        args.push(FilterValue::Str(&like));
    }

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM employees{} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_sql
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
    for arg in &args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(*v),
            FilterValue::Str(s) => data_q.bind(*s),
        };
    }

    let employees = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employees");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, email, company_id, standard_check_in, standard_check_out, auth_code
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Update Employee
///
/// Partial update of profile and schedule fields. The auth code is assigned
/// once at creation and is not updatable.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated successfully"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    if body.get("auth_code").is_some() || body.get("id").is_some() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "auth_code cannot be updated"
        })));
    }

    let update = build_update_sql("employees", &body, "id", employee_id)?;

    let affected = match execute_update(pool.get_ref(), update).await {
        Ok(affected) => affected,
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Email already exists"
                    })));
                }
            }
            error!(error = %e, employee_id, "Failed to update employee");
            return Err(ErrorInternalServerError("Internal Server Error"));
        }
    };

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    // keep the punch-path cache coherent with a possibly renamed employee
    if let Ok(Some((code, id, name))) = sqlx::query_as::<_, (String, u64, String)>(
        "SELECT auth_code, id, name FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    {
        code_cache::put(&code, CachedEmployee { id, name }).await;
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully"
    })))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let code = sqlx::query_scalar::<_, String>("SELECT auth_code FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch employee for delete");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(code) = code else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    };

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Employee not found"
                })));
            }

            code_filter::remove(&code);
            code_cache::evict(&code).await;

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }

        Err(e) => {
            error!(error = %e, employee_id, "Failed to delete employee");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..1000 {
            let code = generate_auth_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn code_validation_accepts_zero_padded() {
        assert!(is_valid_code("000000"));
        assert!(is_valid_code("482913"));
    }

    #[test]
    fn code_validation_rejects_bad_shapes() {
        assert!(!is_valid_code("12345"));
        assert!(!is_valid_code("1234567"));
        assert!(!is_valid_code("12a456"));
        assert!(!is_valid_code(""));
    }
}

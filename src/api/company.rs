use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::{
    model::company::Company,
    utils::db_utils::{build_update_sql, execute_update},
};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateCompany {
    #[schema(example = "Acme Ltda")]
    pub name: String,
    #[schema(example = "Av. Paulista 1000, Sao Paulo")]
    pub address: String,
    #[schema(example = "+5511999990000")]
    pub phone: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CompanyQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Exact name filter
    pub name: Option<String>,
    /// Substring search over name and address
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CompanyListResponse {
    pub data: Vec<Company>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

/// Create Company
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CreateCompany,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Invalid payload"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Company"
)]
pub async fn create_company(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateCompany>,
) -> actix_web::Result<impl Responder> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "name must not be empty"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO companies (name, address, phone)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(&payload.address)
    .bind(&payload.phone)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => Ok(HttpResponse::Created().json(Company {
            id: res.last_insert_id(),
            name: name.to_string(),
            address: payload.address.clone(),
            phone: payload.phone.clone(),
        })),
        Err(e) => {
            error!(error = %e, "Failed to create company");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, Contact with system admin"
            })))
        }
    }
}

/// Paginated company list
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    params(CompanyQuery),
    responses(
        (status = 200, description = "Paginated company list", body = CompanyListResponse)
    ),
    tag = "Company"
)]
pub async fn list_companies(
    pool: web::Data<MySqlPool>,
    query: web::Query<CompanyQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();

    if let Some(name) = query.name.as_deref() {
        where_sql.push_str(" AND name = ?");
        binds.push(name.to_string());
    }

    if let Some(search) = query.search.as_deref() {
        where_sql.push_str(" AND (name LIKE ? OR address LIKE ?)");
        let like = format!("%{}%", search);
        binds.push(like.clone());
        binds.push(like);
    }

    let count_sql = format!("SELECT COUNT(*) FROM companies{}", where_sql);
    debug!(sql = %count_sql, "Counting companies");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &binds {
        count_q = count_q.bind(b);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count companies");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "SELECT * FROM companies{} ORDER BY name LIMIT ? OFFSET ?",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Company>(&data_sql);
    for b in &binds {
        data_q = data_q.bind(b);
    }

    let companies = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch companies");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(CompanyListResponse {
        data: companies,
        page,
        per_page,
        total,
    }))
}

/// Get Company by ID
#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}",
    params(
        ("company_id", Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Company found", body = Company),
        (status = 404, description = "Company not found", body = Object, example = json!({
            "message": "Company not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Company"
)]
pub async fn get_company(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let company_id = path.into_inner();

    let company =
        sqlx::query_as::<_, Company>("SELECT id, name, address, phone FROM companies WHERE id = ?")
            .bind(company_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, company_id, "Failed to fetch company");
                ErrorInternalServerError("Internal Server Error")
            })?;

    match company {
        Some(c) => Ok(HttpResponse::Ok().json(c)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Company not found"
        }))),
    }
}

/// Update Company
#[utoipa::path(
    put,
    path = "/api/v1/companies/{company_id}",
    params(
        ("company_id", Path, description = "Company ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Company updated successfully"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Company not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Company"
)]
pub async fn update_company(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let company_id = path.into_inner();

    let update = build_update_sql("companies", &body, "id", company_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Company not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Company updated successfully"
    })))
}

/// Delete Company
///
/// Cascades to the company's employees and their time records.
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{company_id}",
    params(
        ("company_id", Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Company not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Company"
)]
pub async fn delete_company(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let company_id = path.into_inner();

    let result = sqlx::query("DELETE FROM companies WHERE id = ?")
        .bind(company_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Company not found"
                })));
            }

            // cascaded employee codes stay in the cuckoo filter until the
            // next warmup; lookups still miss through to the database
            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }

        Err(e) => {
            error!(error = %e, company_id, "Failed to delete company");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

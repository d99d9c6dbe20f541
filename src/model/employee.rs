use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "John Doe",
        "email": "john.doe@company.com",
        "company_id": 1,
        "standard_check_in": "09:00:00",
        "standard_check_out": "18:00:00",
        "auth_code": "482913"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = 1)]
    pub company_id: u64,

    #[schema(
        example = "09:00:00",
        value_type = String,
        format = "time"
    )]
    pub standard_check_in: NaiveTime,

    #[schema(
        example = "18:00:00",
        value_type = String,
        format = "time"
    )]
    pub standard_check_out: NaiveTime,

    /// Assigned once at creation, never updated afterwards.
    #[schema(example = "482913")]
    pub auth_code: String,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Company {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Acme Ltda")]
    pub name: String,

    #[schema(example = "Av. Paulista 1000, Sao Paulo")]
    pub address: String,

    #[schema(example = "+5511999990000")]
    pub phone: String,
}

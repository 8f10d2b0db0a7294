use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Client {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub tenant_id: u64,

    /// Unique per tenant; duplicate names are rejected on creation.
    #[schema(example = "Lakeside Dental Office")]
    pub name: String,

    #[schema(example = "200 Lakeshore Blvd W", nullable = true)]
    pub address: Option<String>,

    #[schema(example = "+14165550178", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "active")]
    pub status: String,
}

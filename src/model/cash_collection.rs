use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CashCollection {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub tenant_id: u64,

    #[schema(example = 15)]
    pub job_id: u64,

    #[schema(example = 3, nullable = true)]
    pub client_id: Option<u64>,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = 50.0)]
    pub amount: f64,

    /// kept_by_cleaner | delivered_to_office
    #[schema(example = "kept_by_cleaner")]
    pub cash_handling: String,

    /// pending | approved | settled | disputed | not_applicable
    #[schema(example = "pending")]
    pub compensation_status: String,

    #[schema(example = "2024-07-01", value_type = String, format = "date")]
    pub service_date: NaiveDate,

    #[schema(example = "client paid in cash", nullable = true)]
    pub notes: Option<String>,

    #[schema(example = "amount does not match invoice", nullable = true)]
    pub dispute_reason: Option<String>,

    #[schema(example = 5, nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(example = "2024-07-02T10:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,
}

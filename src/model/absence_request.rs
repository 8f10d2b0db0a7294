use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AbsenceRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub tenant_id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2024-07-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2024-07-05", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    /// pending | approved | rejected
    #[schema(example = "pending", nullable = true)]
    pub status: Option<String>,

    #[schema(example = "family trip", nullable = true)]
    pub reason: Option<String>,

    #[schema(example = "2024-06-20T09:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

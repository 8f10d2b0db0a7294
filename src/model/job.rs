use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Job {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub tenant_id: u64,

    #[schema(example = 3)]
    pub client_id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2024-07-01", value_type = String, format = "date")]
    pub scheduled_date: NaiveDate,

    #[schema(example = "10:00:00", value_type = String)]
    pub start_time: NaiveTime,

    #[schema(example = 120)]
    pub duration_minutes: i32,

    /// scheduled | completed | cancelled
    #[schema(example = "scheduled")]
    pub status: String,

    #[schema(example = "bring ladder", nullable = true)]
    pub notes: Option<String>,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate over a date range. Status moves strictly forward,
/// pending -> approved -> paid; a period is never reopened.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollPeriod {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub tenant_id: u64,

    #[schema(example = "2024-06-01 - 2024-06-14")]
    pub period_name: String,

    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2024-06-14", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    /// pending | approved | paid
    #[schema(example = "pending")]
    pub status: String,

    #[schema(example = 152.5)]
    pub total_hours: f64,

    #[schema(example = 3431.25)]
    pub total_gross: f64,

    #[schema(example = 773.11)]
    pub total_deductions: f64,

    #[schema(example = 2658.14)]
    pub total_net: f64,

    #[schema(example = 5, nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(example = "2024-06-16T14:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,

    #[schema(example = "2024-06-20", value_type = String, format = "date", nullable = true)]
    pub pay_date: Option<NaiveDate>,

    #[schema(example = "2024-06-15T08:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One worker's line in a period, owned by its parent period.
/// gross_pay = regular_hours * hourly_rate; overtime is recorded but not
/// separately rated in the generation path.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollEntry {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub period_id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = 8.0)]
    pub regular_hours: f64,

    #[schema(example = 0.0)]
    pub overtime_hours: f64,

    #[schema(example = 20.0)]
    pub hourly_rate: f64,

    #[schema(example = 160.0)]
    pub gross_pay: f64,

    #[schema(example = 9.52)]
    pub pension_deduction: f64,

    #[schema(example = 2.53)]
    pub insurance_deduction: f64,

    #[schema(example = 24.0)]
    pub tax_deduction: f64,

    #[schema(example = 123.95)]
    pub net_pay: f64,
}

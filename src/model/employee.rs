use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "tenant_id": 42,
        "first_name": "Maria",
        "last_name": "Lopez",
        "email": "maria.lopez@sparkleclean.example",
        "phone": "+14165550133",
        "hourly_rate": 22.5,
        "hire_date": "2024-01-15",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub tenant_id: u64,

    #[schema(example = "Maria")]
    pub first_name: String,

    #[schema(example = "Lopez")]
    pub last_name: String,

    #[schema(example = "maria.lopez@sparkleclean.example")]
    pub email: String,

    #[schema(example = "+14165550133", nullable = true)]
    pub phone: Option<String>,

    /// NULL means the payroll default rate applies.
    #[schema(example = 22.5, nullable = true)]
    pub hourly_rate: Option<f64>,

    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub hire_date: NaiveDate,

    #[schema(example = "active")]
    pub status: String,
}

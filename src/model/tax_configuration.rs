use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-tenant, per-year contribution rates and caps. Read-only during payroll
/// generation; built-in defaults apply when the tenant has none configured.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TaxConfiguration {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub tenant_id: u64,

    #[schema(example = 2024)]
    pub year: i32,

    #[schema(example = 5.95)]
    pub pension_rate: f64,

    #[schema(example = 3867.50)]
    pub pension_cap: f64,

    #[schema(example = 1.58)]
    pub insurance_rate: f64,

    #[schema(example = 1049.12)]
    pub insurance_cap: f64,
}

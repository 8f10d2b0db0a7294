use crate::auth::auth::AuthUser;
use crate::core::wages::DeductionRates;
use crate::model::tax_configuration::TaxConfiguration;
use crate::utils::tax_cache;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UpsertTaxConfiguration {
    #[schema(example = 5.95)]
    pub pension_rate: f64,
    #[schema(example = 3867.50)]
    pub pension_cap: f64,
    #[schema(example = 1.58)]
    pub insurance_rate: f64,
    #[schema(example = 1049.12)]
    pub insurance_cap: f64,
}

#[derive(Serialize, ToSchema)]
pub struct TaxConfigurationResponse {
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
    /// true when no tenant configuration exists and built-in defaults apply
    #[schema(example = false)]
    pub defaults_applied: bool,
}

/// Effective rates for a year
#[utoipa::path(
    get,
    path = "/api/v1/tax-config/{year}",
    params(
        ("year" = i32, Path, description = "Calendar year")
    ),
    responses(
        (status = 200, description = "Effective configuration (defaults surfaced when unset)", body = TaxConfigurationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "TaxConfig"
)]
pub async fn get_tax_config(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i32>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let year = path.into_inner();

    let row = sqlx::query_as::<_, TaxConfiguration>(
        r#"SELECT * FROM tax_configurations WHERE tenant_id = ? AND year = ?"#,
    )
    .bind(auth.tenant_id)
    .bind(year)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, year, "Failed to fetch tax configuration");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let response = match row {
        Some(config) => TaxConfigurationResponse {
            year: config.year,
            pension_rate: config.pension_rate,
            pension_cap: config.pension_cap,
            insurance_rate: config.insurance_rate,
            insurance_cap: config.insurance_cap,
            defaults_applied: false,
        },
        None => {
            let defaults = DeductionRates::default();
            TaxConfigurationResponse {
                year,
                pension_rate: defaults.pension_rate,
                pension_cap: defaults.pension_cap,
                insurance_rate: defaults.insurance_rate,
                insurance_cap: defaults.insurance_cap,
                defaults_applied: true,
            }
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Upsert rates for a year (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/tax-config/{year}",
    params(
        ("year" = i32, Path, description = "Calendar year")
    ),
    request_body = UpsertTaxConfiguration,
    responses(
        (status = 200, description = "Configuration saved", body = Object, example = json!({
            "message": "Tax configuration saved"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "TaxConfig"
)]
pub async fn upsert_tax_config(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i32>,
    payload: web::Json<UpsertTaxConfiguration>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let year = path.into_inner();

    sqlx::query(
        r#"
        INSERT INTO tax_configurations
        (tenant_id, year, pension_rate, pension_cap, insurance_rate, insurance_cap)
        VALUES (?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            pension_rate = VALUES(pension_rate),
            pension_cap = VALUES(pension_cap),
            insurance_rate = VALUES(insurance_rate),
            insurance_cap = VALUES(insurance_cap)
        "#,
    )
    .bind(auth.tenant_id)
    .bind(year)
    .bind(payload.pension_rate)
    .bind(payload.pension_cap)
    .bind(payload.insurance_rate)
    .bind(payload.insurance_cap)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, year, "Failed to save tax configuration");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // next payroll generation must see the new rates
    tax_cache::invalidate(auth.tenant_id, year).await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Tax configuration saved"
    })))
}

use anyhow::Result;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::core::wages::DeductionRates;

/// Per-(tenant, year) deduction rates. Payroll generation hits this on every
/// run; entries are invalidated when the tenant's configuration is updated.
pub static TAX_CACHE: Lazy<Cache<(u64, i32), DeductionRates>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(3600)) // 1h TTL
        .build()
});

/// Resolve the deduction rates for a tenant/year, falling back to the
/// built-in defaults when the tenant has none configured.
pub async fn rates_for(pool: &MySqlPool, tenant_id: u64, year: i32) -> Result<DeductionRates> {
    if let Some(rates) = TAX_CACHE.get(&(tenant_id, year)).await {
        return Ok(rates);
    }

    let row = sqlx::query_as::<_, (f64, f64, f64, f64)>(
        r#"
        SELECT pension_rate, pension_cap, insurance_rate, insurance_cap
        FROM tax_configurations
        WHERE tenant_id = ? AND year = ?
        "#,
    )
    .bind(tenant_id)
    .bind(year)
    .fetch_optional(pool)
    .await?;

    let rates = match row {
        Some((pension_rate, pension_cap, insurance_rate, insurance_cap)) => DeductionRates {
            pension_rate,
            pension_cap,
            insurance_rate,
            insurance_cap,
        },
        None => {
            log::info!(
                "No tax configuration for tenant {} year {}, using defaults",
                tenant_id,
                year
            );
            DeductionRates::default()
        }
    };

    TAX_CACHE.insert((tenant_id, year), rates).await;
    Ok(rates)
}

/// Drop the cached entry after an upsert so the next generation re-reads.
pub async fn invalidate(tenant_id: u64, year: i32) {
    TAX_CACHE.invalidate(&(tenant_id, year)).await;
}

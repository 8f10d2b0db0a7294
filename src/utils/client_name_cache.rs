use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// true  => name is TAKEN for that tenant
/// false => name is AVAILABLE (usually we store only taken)
pub static CLIENT_NAME_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

#[inline]
fn key(tenant_id: u64, name: &str) -> String {
    format!("{}:{}", tenant_id, name.trim().to_lowercase())
}

/// Mark a single client name as taken
pub async fn mark_taken(tenant_id: u64, name: &str) {
    CLIENT_NAME_CACHE.insert(key(tenant_id, name), true).await;
}

/// Check if a client name is taken for the tenant
pub async fn is_taken(tenant_id: u64, name: &str) -> bool {
    CLIENT_NAME_CACHE
        .get(&key(tenant_id, name))
        .await
        .unwrap_or(false)
}

/// Batch mark names as taken
async fn batch_mark(keys: &[String]) {
    let futures: Vec<_> = keys
        .iter()
        .map(|k| CLIENT_NAME_CACHE.insert(k.clone(), true))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load only RECENTLY ACTIVE client names into the in-memory cache (batched)
pub async fn warmup_client_name_cache(
    pool: &MySqlPool,
    days: u32,
    batch_size: usize,
) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, String)>(
        r#"
        SELECT c.tenant_id, c.name
        FROM clients c
        WHERE EXISTS (
            SELECT 1 FROM jobs j
            WHERE j.client_id = c.id
              AND j.scheduled_date >= CURDATE() - INTERVAL ? DAY
        )
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (tenant_id, name) = row?;
        batch.push(key(tenant_id, &name));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining names
    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!(
        "Client name cache warmup complete: {} active clients (last {} days)",
        total_count,
        days
    );

    Ok(())
}

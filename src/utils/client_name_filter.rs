use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Tune these based on real client counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static CLIENT_NAME_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Names are only unique within a tenant, so the filter keys on both.
#[inline]
fn key(tenant_id: u64, name: &str) -> String {
    format!("{}:{}", tenant_id, name.trim().to_lowercase())
}

/// Check if a client name might already exist for the tenant
/// (false positives possible)
pub fn might_exist(tenant_id: u64, name: &str) -> bool {
    let key = key(tenant_id, name);
    CLIENT_NAME_FILTER
        .read()
        .expect("client name filter poisoned")
        .contains(&key)
}

/// Insert a single client name into the filter
pub fn insert(tenant_id: u64, name: &str) {
    let key = key(tenant_id, name);
    CLIENT_NAME_FILTER
        .write()
        .expect("client name filter poisoned")
        .add(&key);
}

/// Remove a client name from the filter
pub fn remove(tenant_id: u64, name: &str) {
    let key = key(tenant_id, name);
    CLIENT_NAME_FILTER
        .write()
        .expect("client name filter poisoned")
        .remove(&key);
}

/// Warm up the client name filter using streaming + batching
pub async fn warmup_client_name_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (u64, String)>("SELECT tenant_id, name FROM clients").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (tenant_id, name) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(key(tenant_id, &name));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Client name filter warmup complete: {} clients", total);
    Ok(())
}

/// Insert a batch of pre-built keys
fn insert_batch(keys: &[String]) {
    let mut filter = CLIENT_NAME_FILTER
        .write()
        .expect("client name filter poisoned");

    for key in keys {
        filter.add(key);
    }
}

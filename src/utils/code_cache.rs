use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// What the punch hot path needs back from a code lookup without touching
/// the database: who the code belongs to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CachedEmployee {
    pub id: u64,
    pub name: String,
}

pub static CODE_CACHE: Lazy<Cache<String, CachedEmployee>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Remember which employee a code resolves to
pub async fn put(code: &str, employee: CachedEmployee) {
    CODE_CACHE.insert(code.trim().to_string(), employee).await;
}

/// Resolve a code from the cache, if present
pub async fn get(code: &str) -> Option<CachedEmployee> {
    CODE_CACHE.get(code.trim()).await
}

/// Drop a code, e.g. after the employee was deleted
pub async fn evict(code: &str) {
    CODE_CACHE.invalidate(code.trim()).await;
}

/// Batch insert resolved codes
async fn batch_put(entries: &[(String, CachedEmployee)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|(code, employee)| CODE_CACHE.insert(code.clone(), employee.clone()))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load the whole roster of auth codes into the in-memory cache (batched)
pub async fn warmup_code_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, u64, String)>(
        r#"
        SELECT auth_code, id, name
        FROM employees
        ORDER BY id
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (code, id, name) = row?;
        batch.push((code.trim().to_string(), CachedEmployee { id, name }));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_put(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining entries
    if !batch.is_empty() {
        batch_put(&batch).await;
    }

    log::info!("Auth code cache warmup complete: {} employees", total_count);

    Ok(())
}

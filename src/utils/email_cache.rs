use std::time::Duration;

use moka::future::Cache;

use super::email_filter::normalize;

/// Positive cache of registered emails.
/// true  => email is TAKEN; free emails are never stored.
pub struct EmailCache {
    cache: Cache<String, bool>,
}

impl Default for EmailCache {
    fn default() -> Self {
        Self::new(500_000, Duration::from_secs(86_400)) // 24h TTL
    }
}

impl EmailCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn mark_taken(&self, email: &str) {
        self.cache.insert(normalize(email), true).await;
    }

    pub async fn is_taken(&self, email: &str) -> bool {
        self.cache.get(&normalize(email)).await.unwrap_or(false)
    }

    /// Batch mark emails as taken
    pub async fn warmup(&self, emails: &[String], batch_size: usize) -> usize {
        let mut total = 0usize;
        for batch in emails.chunks(batch_size.max(1)) {
            let inserts: Vec<_> = batch
                .iter()
                .map(|e| self.cache.insert(normalize(e), true))
                .collect();

            // Await all insertions concurrently
            futures::future::join_all(inserts).await;
            total += batch.len();
        }
        total
    }
}

use std::sync::RwLock;

use autoscale_cuckoo_filter::CuckooFilter;
use tracing::warn;

/// Expected capacity and false-positive rate.
/// Tune these based on real user counts.
pub const FILTER_CAPACITY: usize = 100_000;
pub const FALSE_POSITIVE_RATE: f64 = 0.001;

#[inline]
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Probabilistic set of registered emails: a miss means "definitely free".
pub struct EmailFilter {
    inner: RwLock<CuckooFilter<String>>,
}

impl Default for EmailFilter {
    fn default() -> Self {
        Self::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)
    }
}

impl EmailFilter {
    pub fn new(capacity: usize, false_positive_rate: f64) -> Self {
        Self {
            inner: RwLock::new(CuckooFilter::new(capacity, false_positive_rate)),
        }
    }

    /// Check if an email might be registered (false positives possible).
    /// A poisoned filter answers "maybe" so callers fall through to the store.
    pub fn might_exist(&self, email: &str) -> bool {
        let email = normalize(email);
        self.inner
            .read()
            .map(|filter| filter.contains(&email))
            .unwrap_or(true)
    }

    pub fn insert(&self, email: &str) {
        let email = normalize(email);
        match self.inner.write() {
            Ok(mut filter) => {
                filter.add(&email);
            }
            Err(_) => warn!("email filter poisoned, skipping insert"),
        }
    }

    /// Insert many emails under one lock, in batches of `batch_size`.
    pub fn warmup(&self, emails: &[String], batch_size: usize) -> usize {
        let mut total = 0usize;
        for batch in emails.chunks(batch_size.max(1)) {
            let Ok(mut filter) = self.inner.write() else {
                warn!("email filter poisoned, warmup aborted");
                break;
            };
            for email in batch {
                filter.add(&normalize(email));
                total += 1;
            }
        }
        total
    }
}

use anyhow::Result;

use super::{email_cache::EmailCache, email_filter::EmailFilter};
use crate::{error::AppError, store::Store};

/// Layered email-availability check used by signup.
#[derive(Default)]
pub struct EmailIndex {
    filter: EmailFilter,
    cache: EmailCache,
}

impl EmailIndex {
    /// true  => email AVAILABLE
    /// false => email TAKEN
    pub async fn is_available(&self, email: &str, store: &Store) -> Result<bool, AppError> {
        // 1️⃣ Cuckoo filter: fast negative
        if !self.filter.might_exist(email) {
            return Ok(true);
        }

        // 2️⃣ Moka cache: fast positive
        if self.cache.is_taken(email).await {
            return Ok(false);
        }

        // 3️⃣ Store fallback
        let taken = store.email_taken(email)?;
        if taken {
            self.cache.mark_taken(email).await;
        }
        Ok(!taken)
    }

    pub async fn remember(&self, email: &str) {
        self.filter.insert(email);
        self.cache.mark_taken(email).await;
    }

    /// Loads every registered email into both layers.
    pub async fn warmup(&self, store: &Store, batch_size: usize) -> Result<()> {
        let emails = store.user_emails()?;

        let filtered = self.filter.warmup(&emails, batch_size);
        log::info!("Email filter warmup complete: {} users", filtered);

        let cached = self.cache.warmup(&emails, batch_size).await;
        log::info!("Email cache warmup complete: {} users", cached);

        Ok(())
    }
}

//! In-process cache backend built on moka.

use std::time::Duration;

use moka::future::Cache;

use super::{CacheEntry, CacheService};
use crate::error::CacheError;

/// Bounded, TTL-evicting cache. Inserts are atomic per key.
#[derive(Clone)]
pub struct MokaCacheService {
    cache: Cache<String, CacheEntry>,
}

impl MokaCacheService {
    /// Create a cache holding at most `max_capacity` entries for `ttl` each.
    #[must_use]
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build();
        Self { cache }
    }

    /// Number of entries currently held (approximate until pending tasks run).
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait::async_trait]
impl CacheService for MokaCacheService {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.cache.get(key).await
    }

    async fn put(&self, key: String, entry: CacheEntry) -> Result<(), CacheError> {
        self.cache.insert(key, entry).await;
        Ok(())
    }
}

impl std::fmt::Debug for MokaCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheService").field("entries", &self.entry_count()).finish()
    }
}

//! Short-lived cache for upstream responses
//!
//! Keys carry a time bucket derived from the evaluation instant, so two
//! requests for the same symbol inside one TTL window share an entry while
//! requests pinned to different instants never collide.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cached::{Cached, TimedCache};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use adviser_core::error::Result;

/// Cache key for one upstream endpoint call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Symbol the request concerns, or a fixed tag for symbol-less endpoints
    pub symbol: String,
    /// Endpoint or operation name
    pub endpoint: String,
    /// Evaluation instant quantized to the cache TTL
    pub bucket: i64,
}

impl CacheKey {
    /// Create a key for a request evaluated at `as_of`
    pub fn new(
        symbol: impl Into<String>,
        endpoint: impl Into<String>,
        as_of: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let ttl_secs = ttl.as_secs().max(1) as i64;
        Self {
            symbol: symbol.into(),
            endpoint: endpoint.into(),
            bucket: as_of.timestamp().div_euclid(ttl_secs),
        }
    }
}

/// Thread-safe cache of serialized upstream responses
pub struct ResponseCache {
    cache: Arc<RwLock<TimedCache<CacheKey, serde_json::Value>>>,
}

impl ResponseCache {
    /// Create a new cache with the specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: CacheKey, value: serde_json::Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get a typed value, or fetch and cache it on a miss
    pub async fn get_or_fetch<T, F, Fut>(&self, key: CacheKey, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(?key, "cache hit");
            return Ok(serde_json::from_value(value)?);
        }

        tracing::debug!(?key, "cache miss");

        let fresh = fetcher().await?;
        self.insert(key, serde_json::to_value(&fresh)?).await;

        Ok(fresh)
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for ResponseCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

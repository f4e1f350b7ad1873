//! Upstream data access: caching, retries, and rate limiting
//!
//! Every provider call flows through [`SourceHub`] so the whole pipeline
//! shares one response cache, one rate limiter, and one retry policy. The
//! synthesizer never talks to a provider directly.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use adviser_core::error::Result;
use adviser_core::providers::{MarketDataSource, NewsSource, ReferenceIndexSource};
use adviser_core::sentiment::SentimentItem;
use adviser_core::series::PriceSeries;
use adviser_core::symbol::Symbol;

use crate::cache::{CacheKey, ResponseCache};
use crate::config::FetchConfig;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Cache-key tag for the symbol-less reference index endpoint
const INDEX_TAG: &str = "^REF";

/// Gateway to the three upstream data providers
pub struct SourceHub {
    market: Arc<dyn MarketDataSource>,
    news: Arc<dyn NewsSource>,
    index: Arc<dyn ReferenceIndexSource>,
    cache: ResponseCache,
    rate_limiter: SharedRateLimiter,
    config: FetchConfig,
}

impl SourceHub {
    /// Create a hub over the given providers
    pub fn new(
        market: Arc<dyn MarketDataSource>,
        news: Arc<dyn NewsSource>,
        index: Arc<dyn ReferenceIndexSource>,
        config: FetchConfig,
    ) -> Self {
        let per_minute = NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            market,
            news,
            index,
            cache: ResponseCache::new(config.cache_ttl),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            config,
        }
    }

    /// Daily bars for `symbol`, cached per TTL window
    pub async fn price_history(
        &self,
        symbol: &Symbol,
        lookback_days: u32,
        as_of: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let key = CacheKey::new(
            symbol.as_str(),
            "price_history",
            as_of,
            self.config.cache_ttl,
        );
        self.cache
            .get_or_fetch(key, || {
                self.fetch_with_retry("price_history", || {
                    self.market.get_price_history(symbol, lookback_days)
                })
            })
            .await
    }

    /// Scored news items for `symbol`, cached per TTL window
    pub async fn news(
        &self,
        symbol: &Symbol,
        lookback_hours: u32,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<SentimentItem>> {
        let key = CacheKey::new(symbol.as_str(), "news", as_of, self.config.cache_ttl);
        self.cache
            .get_or_fetch(key, || {
                self.fetch_with_retry("news", || self.news.get_news(symbol, lookback_hours))
            })
            .await
    }

    /// Reference index bars, cached per TTL window
    pub async fn reference_index(
        &self,
        lookback_days: u32,
        as_of: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let key = CacheKey::new(INDEX_TAG, "reference_index", as_of, self.config.cache_ttl);
        self.cache
            .get_or_fetch(key, || {
                self.fetch_with_retry("reference_index", || {
                    self.index.get_reference_index(lookback_days)
                })
            })
            .await
    }

    /// Run one upstream operation with rate limiting and exponential backoff
    ///
    /// Only errors the provider marks as retryable (transport failures) are
    /// retried; data-quality errors surface immediately.
    async fn fetch_with_retry<T, F, Fut>(&self, source: &'static str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            self.rate_limiter.until_ready().await;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt + 1 < self.config.max_retries => {
                    let delay = self.config.retry_backoff(attempt);
                    tracing::warn!(
                        source,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "fetch failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::warn!(source, attempt, error = %err, "fetch failed, giving up");
                    return Err(err);
                }
            }
        }
    }
}

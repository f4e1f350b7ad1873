//! Contracts through which market data enters the pipeline
//!
//! Implementations live outside the core: the engine ships a deterministic
//! offline feed, tests script failures and delays, and real transports can
//! be mounted without touching the synthesizer.

use async_trait::async_trait;

use crate::error::Result;
use crate::sentiment::SentimentItem;
use crate::series::PriceSeries;
use crate::symbol::Symbol;

/// Historical bars for individual symbols
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily bars covering up to `lookback_days` before the evaluation instant
    async fn get_price_history(&self, symbol: &Symbol, lookback_days: u32) -> Result<PriceSeries>;
}

/// Scored headlines for individual symbols
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Items published within `lookback_hours` of the evaluation instant,
    /// newest last; an empty window is a valid response, not an error
    async fn get_news(&self, symbol: &Symbol, lookback_hours: u32) -> Result<Vec<SentimentItem>>;
}

/// Bars for the reference index used by beta and relative-risk math
#[async_trait]
pub trait ReferenceIndexSource: Send + Sync {
    async fn get_reference_index(&self, lookback_days: u32) -> Result<PriceSeries>;
}

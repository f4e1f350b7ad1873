//! Deterministic offline data feed
//!
//! Implements all three provider contracts from a hash of the symbol, so
//! the binary runs without network access. The same symbol and anchor
//! always produce the same bars and headlines, which keeps reports
//! reproducible run over run.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};

use adviser_core::error::Result;
use adviser_core::providers::{MarketDataSource, NewsSource, ReferenceIndexSource};
use adviser_core::sentiment::SentimentItem;
use adviser_core::series::{Bar, PriceSeries};
use adviser_core::symbol::Symbol;

/// Headline templates with a base tone each; the per-item hash nudges the
/// tone and picks the template
const HEADLINES: [(&str, f64); 8] = [
    ("quarterly earnings beat consensus estimates", 0.7),
    ("analyst downgrades cite margin pressure", -0.6),
    ("new product line expands addressable market", 0.5),
    ("regulatory inquiry weighs on near-term outlook", -0.5),
    ("guidance raised on strong subscription growth", 0.8),
    ("supply constraints expected to ease next quarter", 0.3),
    ("institutional ownership increased last quarter", 0.4),
    ("competitive pricing pressure intensifies", -0.4),
];

const NEWS_OUTLETS: [&str; 3] = ["market-wire", "finance-daily", "sector-brief"];

/// Seed tag for the reference index series, shared by every feed instance
const INDEX_SEED_TAG: &str = "reference-index";

/// Offline provider for price history, news, and the reference index
///
/// All data is derived from FNV-1a hashes, anchored so the most recent bar
/// lands exactly on `anchor`. Asset and index series share one timestamp
/// grid, which gives the risk evaluator full overlap.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticFeed {
    anchor: DateTime<Utc>,
}

impl SyntheticFeed {
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    /// Daily bars ending at the anchor, drifting and wobbling by hash
    fn bars(
        &self,
        tag: &str,
        lookback_days: u32,
        base_price: f64,
        swing: f64,
    ) -> Result<PriceSeries> {
        let seed = fnv1a(tag);
        let days = i64::from(lookback_days.max(1));
        let drift = (unit(seed, 0) - 0.375) * 0.008;
        let mut close = base_price * (0.8 + 0.4 * unit(seed, 1));

        let mut bars = Vec::with_capacity(days as usize);
        for i in 0..days {
            let phase = i as f64 / 9.0;
            let wobble = swing * (phase.sin() * 0.6 + unit(seed, 100 + i as u64) - 0.5);
            close = (close * (1.0 + drift + wobble)).max(0.01);
            let spread = close * (0.002 + 0.004 * unit(seed, 500 + i as u64));
            bars.push(Bar {
                timestamp: self.anchor - ChronoDuration::days(days - 1 - i),
                open: close - spread * 0.5,
                high: close + spread,
                low: close - spread,
                close,
                volume: 500_000 + mix(seed, 900 + i as u64) % 2_000_000,
            });
        }
        PriceSeries::new(bars)
    }
}

#[async_trait]
impl MarketDataSource for SyntheticFeed {
    async fn get_price_history(&self, symbol: &Symbol, lookback_days: u32) -> Result<PriceSeries> {
        let seed = fnv1a(symbol.as_str());
        let base_price = 30.0 + 400.0 * unit(seed, 7);
        self.bars(symbol.as_str(), lookback_days, base_price, 0.015)
    }
}

#[async_trait]
impl NewsSource for SyntheticFeed {
    async fn get_news(&self, symbol: &Symbol, lookback_hours: u32) -> Result<Vec<SentimentItem>> {
        let seed = fnv1a(symbol.as_str());
        let span = u64::from(lookback_hours.max(2) - 1);
        let count = 3 + mix(seed, 30) % 4;

        let items = (0..count)
            .map(|i| {
                let (template, base_tone) = HEADLINES[(mix(seed, 40 + i) % 8) as usize];
                let outlet = NEWS_OUTLETS[(mix(seed, 50 + i) % 3) as usize];
                let hours_back = 1 + mix(seed, 60 + i) % span;
                SentimentItem::new(
                    outlet,
                    self.anchor - ChronoDuration::hours(hours_back as i64),
                    format!("{symbol}: {template}"),
                    base_tone + (unit(seed, 70 + i) - 0.5) * 0.2,
                    0.5 + 0.5 * unit(seed, 80 + i),
                )
            })
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl ReferenceIndexSource for SyntheticFeed {
    async fn get_reference_index(&self, lookback_days: u32) -> Result<PriceSeries> {
        self.bars(INDEX_SEED_TAG, lookback_days, 4_000.0, 0.006)
    }
}

/// FNV-1a over the tag bytes
fn fnv1a(tag: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for byte in tag.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// SplitMix-style mixer keyed by seed and index
fn mix(seed: u64, index: u64) -> u64 {
    let mut z = seed.wrapping_add(index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Uniform value in [0, 1)
fn unit(seed: u64, index: u64) -> f64 {
    (mix(seed, index) >> 11) as f64 / (1_u64 << 53) as f64
}

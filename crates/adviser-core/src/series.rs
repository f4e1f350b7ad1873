//! Price history primitives

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AdviserError, Result};

/// Single OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Immutable price history for one instrument, strictly ordered by timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, rejecting empty input, unordered or duplicate
    /// timestamps, and non-finite or non-positive prices
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(AdviserError::DegenerateInput(
                "price series is empty".to_string(),
            ));
        }
        for bar in &bars {
            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
                return Err(AdviserError::DegenerateInput(format!(
                    "non-positive or non-finite price at {}",
                    bar.timestamp
                )));
            }
        }
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(AdviserError::DegenerateInput(format!(
                    "timestamps must be strictly increasing, {} follows {}",
                    pair[1].timestamp, pair[0].timestamp
                )));
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices in time order
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Most recent closing price
    pub fn last_close(&self) -> f64 {
        self.bars[self.bars.len() - 1].close
    }

    /// Timestamp of the most recent bar
    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.bars[self.bars.len() - 1].timestamp
    }

    /// Simple period-over-period returns, `len() - 1` values
    pub fn returns(&self) -> Vec<f64> {
        self.bars
            .windows(2)
            .map(|pair| pair[1].close / pair[0].close - 1.0)
            .collect()
    }

    /// Close pairs `(self, other)` for bars whose timestamps match exactly
    pub fn inner_join(&self, other: &PriceSeries) -> Vec<(f64, f64)> {
        let mut joined = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.bars.len() && j < other.bars.len() {
            let (left, right) = (&self.bars[i], &other.bars[j]);
            match left.timestamp.cmp(&right.timestamp) {
                std::cmp::Ordering::Equal => {
                    joined.push((left.close, right.close));
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        joined
    }
}

impl TryFrom<Vec<Bar>> for PriceSeries {
    type Error = AdviserError;

    fn try_from(bars: Vec<Bar>) -> Result<Self> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<Bar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

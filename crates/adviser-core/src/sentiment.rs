//! Scored news items feeding the sentiment aggregator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scored headline about a symbol
///
/// `polarity` is the tone of the item in [-1, 1], `relevance` how strongly
/// it concerns the symbol in [0, 1]. Both are clamped on construction;
/// items arriving through other paths are re-clamped by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentItem {
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub headline: String,
    pub polarity: f64,
    pub relevance: f64,
}

impl SentimentItem {
    pub fn new(
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
        headline: impl Into<String>,
        polarity: f64,
        relevance: f64,
    ) -> Self {
        Self {
            source: source.into(),
            timestamp,
            headline: headline.into(),
            polarity: polarity.clamp(-1.0, 1.0),
            relevance: relevance.clamp(0.0, 1.0),
        }
    }
}

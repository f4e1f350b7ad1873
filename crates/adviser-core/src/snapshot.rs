//! Per-component analysis outputs carried into the final report

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Direction read from the technical indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Display for Trend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        };
        f.write_str(text)
    }
}

/// Technical component output
///
/// `indicators` is an ordered map so serialized reports are byte-stable.
/// Support and resistance hold pivot closes in chronological order and may
/// be empty when the window has no qualifying pivot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub trend: Trend,
    pub indicators: BTreeMap<String, f64>,
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

impl TechnicalSnapshot {
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).copied()
    }

    /// Relative strength index, when computed
    pub fn rsi(&self) -> Option<f64> {
        self.indicator("rsi")
    }

    /// Most recent resistance pivot, if any
    pub fn nearest_resistance(&self) -> Option<f64> {
        self.resistance.last().copied()
    }

    /// Most recent support pivot, if any
    pub fn nearest_support(&self) -> Option<f64> {
        self.support.last().copied()
    }
}

/// Aggregate tone bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl Display for SentimentCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        };
        f.write_str(text)
    }
}

/// Sentiment component output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub score: f64,
    pub category: SentimentCategory,
    pub confidence: f64,
    pub item_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
}

impl SentimentSummary {
    /// The response to an empty news window: neutral with zero confidence
    pub fn soft_neutral() -> Self {
        Self {
            score: 0.0,
            category: SentimentCategory::Neutral,
            confidence: 0.0,
            item_count: 0,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
        }
    }
}

/// Band assigned from the composite risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Band a composite risk score (0.6 x one-day loss + 0.4 x annual vol)
    pub fn from_score(score: f64) -> Self {
        if score < 0.15 {
            Self::Low
        } else if score < 0.25 {
            Self::Medium
        } else if score < 0.40 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very high",
        };
        f.write_str(text)
    }
}

/// Risk component output
///
/// `var_95` is the one-day historical value at risk as a negative fraction,
/// so -0.024 reads as a 2.4% one-day loss at the 95% level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub annualized_volatility: f64,
    pub beta: f64,
    pub var_95: f64,
    pub max_drawdown: f64,
    pub risk_score: f64,
    pub level: RiskLevel,
}

//! Final recommendation and the surrounding report envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::UserProfile;
use crate::snapshot::{RiskProfile, SentimentSummary, TechnicalSnapshot};
use crate::symbol::Symbol;

/// Recommended position change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        };
        f.write_str(text)
    }
}

/// The synthesized decision
///
/// `rationale` is ordered and deterministic for identical inputs;
/// `warnings` records every degraded component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub confidence: f64,
    pub target_price: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub expected_return: f64,
    pub rationale: Vec<String>,
    pub warnings: Vec<String>,
}

impl Recommendation {
    /// Price-level invariant: buy orders stop below and target above entry,
    /// sell orders mirror, hold pins all three to the current price
    pub fn prices_consistent(&self, current_price: f64) -> bool {
        match self.action {
            Action::Buy => {
                self.stop_loss < self.entry_price && self.entry_price < self.target_price
            }
            Action::Sell => {
                self.target_price < self.entry_price && self.entry_price < self.stop_loss
            }
            Action::Hold => {
                (self.target_price - current_price).abs() < f64::EPSILON
                    && (self.entry_price - current_price).abs() < f64::EPSILON
                    && (self.stop_loss - current_price).abs() < f64::EPSILON
            }
        }
    }
}

/// One analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub symbol: Symbol,
    pub profile: UserProfile,
    /// Evaluation instant; `None` resolves to now, once, at collect time
    pub as_of: Option<DateTime<Utc>>,
}

impl AnalyzeRequest {
    pub fn new(symbol: Symbol, profile: UserProfile) -> Self {
        Self {
            symbol,
            profile,
            as_of: None,
        }
    }

    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }
}

/// Recommendation plus the component outputs it was synthesized from
///
/// A `None` component was unavailable for this run; the corresponding
/// reason is in `recommendation.warnings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: Symbol,
    pub as_of: DateTime<Utc>,
    pub current_price: f64,
    pub recommendation: Recommendation,
    pub technical: Option<TechnicalSnapshot>,
    pub sentiment: Option<SentimentSummary>,
    pub risk: Option<RiskProfile>,
}

impl AnalysisReport {
    /// How many of the three components produced output
    pub fn component_count(&self) -> usize {
        usize::from(self.technical.is_some())
            + usize::from(self.sentiment.is_some())
            + usize::from(self.risk.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendation(action: Action, prices: (f64, f64, f64)) -> Recommendation {
        Recommendation {
            action,
            confidence: 0.7,
            target_price: prices.0,
            entry_price: prices.1,
            stop_loss: prices.2,
            expected_return: 0.0,
            rationale: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn buy_requires_stop_below_entry_below_target() {
        let rec = recommendation(Action::Buy, (110.0, 100.0, 92.0));
        assert!(rec.prices_consistent(100.0));

        let inverted = recommendation(Action::Buy, (92.0, 100.0, 110.0));
        assert!(!inverted.prices_consistent(100.0));
    }

    #[test]
    fn sell_mirrors_buy_ordering() {
        let rec = recommendation(Action::Sell, (90.0, 100.0, 108.0));
        assert!(rec.prices_consistent(100.0));
    }

    #[test]
    fn hold_pins_all_prices_to_current() {
        let rec = recommendation(Action::Hold, (100.0, 100.0, 100.0));
        assert!(rec.prices_consistent(100.0));
        assert!(!rec.prices_consistent(101.0));
    }
}

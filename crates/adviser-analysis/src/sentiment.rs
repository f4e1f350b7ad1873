//! Recency-weighted aggregation of scored news items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use adviser_core::error::{AdviserError, Result};
use adviser_core::sentiment::SentimentItem;
use adviser_core::snapshot::{SentimentCategory, SentimentSummary};

/// Tunables for the sentiment component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Hours after which an item's weight halves
    pub half_life_hours: f64,

    /// Absolute score above which tone leaves the neutral bucket
    pub category_threshold: f64,

    /// Item count at which the volume factor stops discounting confidence
    pub saturation_count: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            half_life_hours: 48.0,
            category_threshold: 0.2,
            saturation_count: 10,
        }
    }
}

impl SentimentConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.half_life_hours.is_finite() || self.half_life_hours <= 0.0 {
            return Err(AdviserError::Config(
                "half_life_hours must be positive".to_string(),
            ));
        }
        if !self.category_threshold.is_finite()
            || self.category_threshold <= 0.0
            || self.category_threshold >= 1.0
        {
            return Err(AdviserError::Config(
                "category_threshold must lie strictly between 0 and 1".to_string(),
            ));
        }
        if self.saturation_count == 0 {
            return Err(AdviserError::Config(
                "saturation_count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Collapses a window of scored headlines into one tone summary
///
/// Weights decay exponentially with age so stale coverage cannot drown out
/// fresh coverage. Never fails: an empty window (or one whose items carry
/// no weight at all) produces the soft-neutral summary instead of an error.
pub struct SentimentAggregator {
    config: SentimentConfig,
}

impl SentimentAggregator {
    pub fn new(config: SentimentConfig) -> Self {
        Self { config }
    }

    /// Aggregate items evaluated at `as_of`
    pub fn aggregate(&self, items: &[SentimentItem], as_of: DateTime<Utc>) -> SentimentSummary {
        if items.is_empty() {
            return SentimentSummary::soft_neutral();
        }

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        let mut polarities = Vec::with_capacity(items.len());
        let mut positive_count = 0;
        let mut negative_count = 0;
        let mut neutral_count = 0;

        for item in items {
            let polarity = item.polarity.clamp(-1.0, 1.0);
            let relevance = item.relevance.clamp(0.0, 1.0);
            let weight = self.decay_weight(relevance, item.timestamp, as_of);

            weighted_sum += polarity * weight;
            total_weight += weight;
            polarities.push(polarity);

            if polarity >= self.config.category_threshold {
                positive_count += 1;
            } else if polarity <= -self.config.category_threshold {
                negative_count += 1;
            } else {
                neutral_count += 1;
            }
        }

        // Zero total weight means every item is irrelevant or fully decayed
        if total_weight <= 0.0 {
            return SentimentSummary::soft_neutral();
        }

        let score = (weighted_sum / total_weight).clamp(-1.0, 1.0);

        SentimentSummary {
            score,
            category: self.categorize(score),
            confidence: self.confidence(&polarities),
            item_count: items.len(),
            positive_count,
            negative_count,
            neutral_count,
        }
    }

    /// Relevance scaled by exponential half-life decay over the item's age
    ///
    /// Future-dated items get age zero rather than an amplified weight.
    fn decay_weight(&self, relevance: f64, timestamp: DateTime<Utc>, as_of: DateTime<Utc>) -> f64 {
        let age_hours = (as_of - timestamp).num_seconds().max(0) as f64 / 3600.0;
        relevance * 0.5_f64.powf(age_hours / self.config.half_life_hours)
    }

    fn categorize(&self, score: f64) -> SentimentCategory {
        if score >= self.config.category_threshold {
            SentimentCategory::Positive
        } else if score <= -self.config.category_threshold {
            SentimentCategory::Negative
        } else {
            SentimentCategory::Neutral
        }
    }

    /// Agreement across items scaled by coverage volume
    ///
    /// Dispersed polarities shrink the base toward its 0.1 floor; thin
    /// coverage discounts linearly until `saturation_count` items.
    fn confidence(&self, polarities: &[f64]) -> f64 {
        let variance = polarities.iter().copied().population_variance();
        let base = (1.0 - 2.0 * variance).clamp(0.1, 1.0);
        let volume = (polarities.len() as f64 / self.config.saturation_count as f64).min(1.0);
        base * volume
    }
}

//! Analysis components for adviser-rs
//!
//! Three independent, pure components: technical indicators over a price
//! series, recency-weighted news sentiment, and risk metrics against a
//! reference index. The decision synthesizer in `adviser-engine` runs them
//! concurrently and combines their outputs.

pub mod risk;
pub mod sentiment;
pub mod stats;
pub mod technical;

pub use risk::{RiskConfig, RiskEvaluator};
pub use sentiment::{SentimentAggregator, SentimentConfig};
pub use technical::{TechnicalAnalyzer, TechnicalConfig};

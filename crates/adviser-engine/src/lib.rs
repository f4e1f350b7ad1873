//! Decision engine for adviser-rs
//!
//! Owns everything between the provider traits and the final report: the
//! fetch layer (retry, rate limiting, response cache), the scoring and
//! decision rules, the synthesizer that orchestrates the analysis
//! components, batch analysis with a portfolio roll-up, and a
//! deterministic offline data feed.

pub mod cache;
pub mod config;
pub mod portfolio;
pub mod scoring;
pub mod sources;
pub mod synthesizer;
pub mod synthetic;

pub use config::{AdviserConfig, AdviserConfigBuilder, FetchConfig, SynthesisConfig};
pub use portfolio::{PortfolioSummary, summarize};
pub use sources::SourceHub;
pub use synthesizer::DecisionSynthesizer;
pub use synthetic::SyntheticFeed;

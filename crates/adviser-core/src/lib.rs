//! Core domain types and contracts for adviser-rs
//!
//! This crate defines the data model shared by the analysis components and
//! the decision synthesizer, plus the traits through which market data
//! enters the pipeline.

pub mod error;
pub mod profile;
pub mod providers;
pub mod recommendation;
pub mod sentiment;
pub mod series;
pub mod snapshot;
pub mod symbol;

pub use error::{AdviserError, Result};
pub use profile::{InvestmentHorizon, InvestmentStyle, RiskTolerance, UserProfile};
pub use providers::{MarketDataSource, NewsSource, ReferenceIndexSource};
pub use recommendation::{Action, AnalysisReport, AnalyzeRequest, Recommendation};
pub use sentiment::SentimentItem;
pub use series::{Bar, PriceSeries};
pub use snapshot::{
    RiskLevel, RiskProfile, SentimentCategory, SentimentSummary, TechnicalSnapshot, Trend,
};
pub use symbol::Symbol;

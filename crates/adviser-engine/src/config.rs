//! Configuration for the decision synthesis pipeline

use std::time::Duration;

use serde::{Deserialize, Serialize};

use adviser_analysis::{RiskConfig, SentimentConfig, TechnicalConfig};
use adviser_core::error::{AdviserError, Result};
use adviser_core::profile::{InvestmentStyle, RiskTolerance};

/// Relative importance of the three component votes under one style
///
/// Weights are re-normalized over the components actually present, so only
/// their ratios matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub technical: f64,
    pub sentiment: f64,
    pub risk: f64,
}

impl SignalWeights {
    pub fn new(technical: f64, sentiment: f64, risk: f64) -> Self {
        Self {
            technical,
            sentiment,
            risk,
        }
    }

    fn validate(&self, style: &str) -> Result<()> {
        let weights = [self.technical, self.sentiment, self.risk];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AdviserError::Config(format!(
                "{style} weights must be finite and non-negative"
            )));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(AdviserError::Config(format!(
                "{style} weights must sum to more than 0"
            )));
        }
        Ok(())
    }
}

/// How much composite risk and beta one tolerance level absorbs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBand {
    /// Composite risk score at which the risk vote crosses zero
    pub risk_cap: f64,

    /// Beta above which the beta penalty starts accruing
    pub beta_cap: f64,
}

impl ToleranceBand {
    pub fn new(risk_cap: f64, beta_cap: f64) -> Self {
        Self { risk_cap, beta_cap }
    }

    fn validate(&self, tolerance: &str) -> Result<()> {
        if !self.risk_cap.is_finite() || self.risk_cap <= 0.0 {
            return Err(AdviserError::Config(format!(
                "{tolerance} risk_cap must be positive"
            )));
        }
        if !self.beta_cap.is_finite() || self.beta_cap <= 0.0 {
            return Err(AdviserError::Config(format!(
                "{tolerance} beta_cap must be positive"
            )));
        }
        Ok(())
    }
}

/// Tunables for vote combination and recommendation assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Wall-clock budget for each analysis component
    pub component_timeout: Duration,

    /// Combined score beyond which the call leaves hold territory
    pub decision_threshold: f64,

    /// Vote magnitude at which two opposing components count as a conflict
    pub conflict_threshold: f64,

    /// Confidence multiplier applied once per absent component
    pub missing_penalty: f64,

    /// RSI distance from 50 that saturates the technical vote
    pub rsi_vote_span: f64,

    /// Upper clamp on the risk vote; risk headroom never argues harder
    /// than this for a position
    pub risk_vote_cap: f64,

    /// Penalty per unit of beta above the tolerance band's cap
    pub beta_penalty_scale: f64,

    /// Largest beta penalty that can be applied
    pub beta_penalty_max: f64,

    /// Volatility assumed for price targets when the risk component is absent
    pub fallback_volatility: f64,

    /// Base fraction of the target price move at full confidence
    pub target_base: f64,

    /// Additional target move per unit of annualized volatility
    pub target_vol_scale: f64,

    /// Base fraction of the stop-loss distance
    pub stop_base: f64,

    /// Additional stop distance per unit of annualized volatility
    pub stop_vol_scale: f64,

    /// Days of price history requested for the anchor series
    pub price_lookback_days: u32,

    /// Hours of news history requested for the sentiment window
    pub news_lookback_hours: u32,

    /// Vote weights under a conservative style
    pub conservative_weights: SignalWeights,

    /// Vote weights under a moderate style
    pub moderate_weights: SignalWeights,

    /// Vote weights under an aggressive style
    pub aggressive_weights: SignalWeights,

    /// Risk absorption for low tolerance
    pub low_tolerance_band: ToleranceBand,

    /// Risk absorption for medium tolerance
    pub medium_tolerance_band: ToleranceBand,

    /// Risk absorption for high tolerance
    pub high_tolerance_band: ToleranceBand,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            component_timeout: Duration::from_secs(30),
            decision_threshold: 0.3,
            conflict_threshold: 0.3,
            missing_penalty: 0.8,
            rsi_vote_span: 20.0,
            risk_vote_cap: 0.3,
            beta_penalty_scale: 0.25,
            beta_penalty_max: 0.3,
            fallback_volatility: 0.25,
            target_base: 0.06,
            target_vol_scale: 0.4,
            stop_base: 0.03,
            stop_vol_scale: 0.35,
            price_lookback_days: 180,
            news_lookback_hours: 72,
            conservative_weights: SignalWeights::new(0.25, 0.20, 0.55),
            moderate_weights: SignalWeights::new(0.35, 0.35, 0.30),
            aggressive_weights: SignalWeights::new(0.45, 0.35, 0.20),
            low_tolerance_band: ToleranceBand::new(0.12, 0.9),
            medium_tolerance_band: ToleranceBand::new(0.20, 1.3),
            high_tolerance_band: ToleranceBand::new(0.32, 1.8),
        }
    }
}

impl SynthesisConfig {
    /// Vote weights for an investment style
    pub fn weights_for(&self, style: InvestmentStyle) -> SignalWeights {
        match style {
            InvestmentStyle::Conservative => self.conservative_weights,
            InvestmentStyle::Moderate => self.moderate_weights,
            InvestmentStyle::Aggressive => self.aggressive_weights,
        }
    }

    /// Risk absorption band for a risk tolerance
    pub fn band_for(&self, tolerance: RiskTolerance) -> ToleranceBand {
        match tolerance {
            RiskTolerance::Low => self.low_tolerance_band,
            RiskTolerance::Medium => self.medium_tolerance_band,
            RiskTolerance::High => self.high_tolerance_band,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.component_timeout.is_zero() {
            return Err(AdviserError::Config(
                "component_timeout must be greater than 0".to_string(),
            ));
        }
        if !self.decision_threshold.is_finite()
            || self.decision_threshold <= 0.0
            || self.decision_threshold >= 1.0
        {
            return Err(AdviserError::Config(
                "decision_threshold must lie strictly between 0 and 1".to_string(),
            ));
        }
        if !self.conflict_threshold.is_finite()
            || self.conflict_threshold <= 0.0
            || self.conflict_threshold > 1.0
        {
            return Err(AdviserError::Config(
                "conflict_threshold must lie in (0, 1]".to_string(),
            ));
        }
        if !self.missing_penalty.is_finite()
            || self.missing_penalty <= 0.0
            || self.missing_penalty > 1.0
        {
            return Err(AdviserError::Config(
                "missing_penalty must lie in (0, 1]".to_string(),
            ));
        }
        if !self.rsi_vote_span.is_finite() || self.rsi_vote_span <= 0.0 {
            return Err(AdviserError::Config(
                "rsi_vote_span must be positive".to_string(),
            ));
        }
        if !self.risk_vote_cap.is_finite() || self.risk_vote_cap <= 0.0 || self.risk_vote_cap > 1.0
        {
            return Err(AdviserError::Config(
                "risk_vote_cap must lie in (0, 1]".to_string(),
            ));
        }
        if !self.beta_penalty_scale.is_finite()
            || self.beta_penalty_scale < 0.0
            || !self.beta_penalty_max.is_finite()
            || self.beta_penalty_max < 0.0
        {
            return Err(AdviserError::Config(
                "beta penalty parameters must be finite and non-negative".to_string(),
            ));
        }
        if !self.fallback_volatility.is_finite() || self.fallback_volatility < 0.0 {
            return Err(AdviserError::Config(
                "fallback_volatility must be finite and non-negative".to_string(),
            ));
        }
        let price_factors = [
            self.target_base,
            self.target_vol_scale,
            self.stop_base,
            self.stop_vol_scale,
        ];
        if price_factors.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(AdviserError::Config(
                "price factors must be finite and non-negative".to_string(),
            ));
        }
        if self.target_base <= 0.0 || self.stop_base <= 0.0 {
            return Err(AdviserError::Config(
                "target_base and stop_base must be positive".to_string(),
            ));
        }
        if self.price_lookback_days == 0 || self.news_lookback_hours == 0 {
            return Err(AdviserError::Config(
                "lookback windows must be greater than 0".to_string(),
            ));
        }
        self.conservative_weights.validate("conservative")?;
        self.moderate_weights.validate("moderate")?;
        self.aggressive_weights.validate("aggressive")?;
        self.low_tolerance_band.validate("low")?;
        self.medium_tolerance_band.validate("medium")?;
        self.high_tolerance_band.validate("high")?;
        Ok(())
    }
}

/// Tunables for upstream fetches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum attempts per fetch, first try included
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Upstream requests allowed per minute
    pub rate_limit_per_minute: u32,

    /// Lifespan of cached upstream responses
    pub cache_ttl: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff_base: Duration::from_millis(500),
            rate_limit_per_minute: 60,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl FetchConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(AdviserError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit_per_minute == 0 {
            return Err(AdviserError::Config(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }
        if self.cache_ttl.is_zero() {
            return Err(AdviserError::Config(
                "cache_ttl must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Get retry backoff duration for attempt number
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2_u32.pow(attempt)
    }
}

/// Complete configuration for one adviser pipeline
///
/// Shared as `Arc<AdviserConfig>` between the synthesizer and the fetch
/// layer; nothing mutates it after construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdviserConfig {
    pub technical: TechnicalConfig,
    pub sentiment: SentimentConfig,
    pub risk: RiskConfig,
    pub synthesis: SynthesisConfig,
    pub fetch: FetchConfig,
}

impl AdviserConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdviserConfigBuilder {
        AdviserConfigBuilder::default()
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.technical.validate()?;
        self.sentiment.validate()?;
        self.risk.validate()?;
        self.synthesis.validate()?;
        self.fetch.validate()?;
        Ok(())
    }
}

/// Builder for AdviserConfig
#[derive(Debug, Default)]
pub struct AdviserConfigBuilder {
    technical: Option<TechnicalConfig>,
    sentiment: Option<SentimentConfig>,
    risk: Option<RiskConfig>,
    synthesis: Option<SynthesisConfig>,
    fetch: Option<FetchConfig>,
}

impl AdviserConfigBuilder {
    /// Set the technical component configuration
    pub fn technical(mut self, config: TechnicalConfig) -> Self {
        self.technical = Some(config);
        self
    }

    /// Set the sentiment component configuration
    pub fn sentiment(mut self, config: SentimentConfig) -> Self {
        self.sentiment = Some(config);
        self
    }

    /// Set the risk component configuration
    pub fn risk(mut self, config: RiskConfig) -> Self {
        self.risk = Some(config);
        self
    }

    /// Set the synthesis configuration
    pub fn synthesis(mut self, config: SynthesisConfig) -> Self {
        self.synthesis = Some(config);
        self
    }

    /// Set the fetch layer configuration
    pub fn fetch(mut self, config: FetchConfig) -> Self {
        self.fetch = Some(config);
        self
    }

    /// Build the configuration, validating every section
    pub fn build(self) -> Result<AdviserConfig> {
        let config = AdviserConfig {
            technical: self.technical.unwrap_or_default(),
            sentiment: self.sentiment.unwrap_or_default(),
            risk: self.risk.unwrap_or_default(),
            synthesis: self.synthesis.unwrap_or_default(),
            fetch: self.fetch.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

//! Risk metrics for an asset measured against a reference index

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use adviser_core::error::{AdviserError, Result};
use adviser_core::series::PriceSeries;
use adviser_core::snapshot::{RiskLevel, RiskProfile};

use crate::stats;

/// Tunables for the risk component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Minimum number of timestamp-aligned bars shared with the index
    pub min_overlap: usize,

    /// Trading periods per year used to annualize volatility
    pub periods_per_year: f64,

    /// Index return variance below this is treated as degenerate
    pub variance_epsilon: f64,

    /// Confidence level for historical value at risk
    pub var_confidence: f64,

    /// Horizon in days the VaR quantile is scaled to
    pub var_horizon_days: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            min_overlap: 20,
            periods_per_year: 252.0,
            variance_epsilon: 1e-10,
            var_confidence: 0.95,
            var_horizon_days: 1.0,
        }
    }
}

impl RiskConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_overlap < 3 {
            return Err(AdviserError::Config(
                "min_overlap must be at least 3 aligned bars".to_string(),
            ));
        }
        if !self.periods_per_year.is_finite() || self.periods_per_year <= 0.0 {
            return Err(AdviserError::Config(
                "periods_per_year must be positive".to_string(),
            ));
        }
        if !self.variance_epsilon.is_finite() || self.variance_epsilon <= 0.0 {
            return Err(AdviserError::Config(
                "variance_epsilon must be positive".to_string(),
            ));
        }
        if !self.var_confidence.is_finite()
            || self.var_confidence <= 0.5
            || self.var_confidence >= 1.0
        {
            return Err(AdviserError::Config(
                "var_confidence must lie strictly between 0.5 and 1".to_string(),
            ));
        }
        if !self.var_horizon_days.is_finite() || self.var_horizon_days <= 0.0 {
            return Err(AdviserError::Config(
                "var_horizon_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Computes volatility, beta, historical VaR, and drawdown for one asset
///
/// All metrics run over the timestamp-aligned overlap of the asset and the
/// reference index so a calendar mismatch cannot skew beta.
pub struct RiskEvaluator {
    config: RiskConfig,
}

impl RiskEvaluator {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Evaluate the asset series against the reference index series
    pub fn evaluate(&self, asset: &PriceSeries, index: &PriceSeries) -> Result<RiskProfile> {
        let joined = asset.inner_join(index);
        if joined.len() < self.config.min_overlap {
            return Err(AdviserError::InsufficientData {
                context: "risk metrics".to_string(),
                required: self.config.min_overlap,
                actual: joined.len(),
            });
        }

        let (asset_closes, index_closes): (Vec<f64>, Vec<f64>) = joined.into_iter().unzip();
        let asset_returns = stats::simple_returns(&asset_closes);
        let index_returns = stats::simple_returns(&index_closes);

        let index_variance = index_returns.iter().copied().variance();
        if !index_variance.is_finite() || index_variance < self.config.variance_epsilon {
            return Err(AdviserError::DegenerateInput(
                "reference index shows no usable variance over the overlap window".to_string(),
            ));
        }

        let covariance = asset_returns
            .iter()
            .copied()
            .covariance(index_returns.iter().copied());
        let beta = covariance / index_variance;

        let annualized_volatility =
            asset_returns.iter().copied().std_dev() * self.config.periods_per_year.sqrt();

        let var_95 = self.value_at_risk(&asset_returns);
        let max_drawdown = stats::max_drawdown(&asset_closes);

        let risk_score = 0.6 * var_95.abs() + 0.4 * annualized_volatility;

        Ok(RiskProfile {
            annualized_volatility,
            beta,
            var_95,
            max_drawdown,
            risk_score,
            level: RiskLevel::from_score(risk_score),
        })
    }

    /// Historical VaR: the low quantile of the return distribution scaled
    /// to the configured horizon, negative when it names a loss
    fn value_at_risk(&self, returns: &[f64]) -> f64 {
        let mut sorted = returns.to_vec();
        sorted.sort_by(f64::total_cmp);
        stats::quantile_sorted(&sorted, 1.0 - self.config.var_confidence)
            * self.config.var_horizon_days.sqrt()
    }
}

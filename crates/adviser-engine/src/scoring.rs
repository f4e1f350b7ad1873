//! Vote computation and decision rules for the synthesizer
//!
//! Everything here is pure: the same component outputs and configuration
//! always produce the same recommendation.

use adviser_core::profile::{InvestmentStyle, RiskTolerance};
use adviser_core::recommendation::{Action, Recommendation};
use adviser_core::snapshot::{RiskProfile, SentimentSummary, TechnicalSnapshot, Trend};

use crate::config::SynthesisConfig;

/// Per-component directional votes in [-1, +1]; `None` marks an absent
/// component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteSet {
    pub technical: Option<f64>,
    pub sentiment: Option<f64>,
    pub risk: Option<f64>,
}

impl VoteSet {
    /// Score whichever components are present
    pub fn from_components(
        technical: Option<&TechnicalSnapshot>,
        sentiment: Option<&SentimentSummary>,
        risk: Option<&RiskProfile>,
        tolerance: RiskTolerance,
        config: &SynthesisConfig,
    ) -> Self {
        Self {
            technical: technical.map(|snapshot| technical_vote(snapshot, config)),
            sentiment: sentiment.map(sentiment_vote),
            risk: risk.map(|profile| risk_vote(profile, tolerance, config)),
        }
    }

    pub fn present_count(&self) -> usize {
        usize::from(self.technical.is_some())
            + usize::from(self.sentiment.is_some())
            + usize::from(self.risk.is_some())
    }
}

/// Trend direction scaled by how far RSI sits from its midpoint
pub fn technical_vote(snapshot: &TechnicalSnapshot, config: &SynthesisConfig) -> f64 {
    let direction = match snapshot.trend {
        Trend::Bullish => 1.0,
        Trend::Bearish => -1.0,
        Trend::Neutral => return 0.0,
    };
    let rsi = snapshot.rsi().unwrap_or(50.0);
    let strength = ((rsi - 50.0).abs() / config.rsi_vote_span).clamp(0.0, 1.0);
    direction * strength
}

/// Aggregate tone discounted by how much the summary trusts itself
pub fn sentiment_vote(summary: &SentimentSummary) -> f64 {
    (summary.score * summary.confidence).clamp(-1.0, 1.0)
}

/// Headroom left under the tolerance band, minus a penalty for excess beta
///
/// Crosses zero when the composite risk score reaches the band's cap and
/// saturates at -1 at twice the cap. Low risk never argues harder than
/// `risk_vote_cap` for a position; risk can veto, not cheerlead.
pub fn risk_vote(profile: &RiskProfile, tolerance: RiskTolerance, config: &SynthesisConfig) -> f64 {
    let band = config.band_for(tolerance);
    let headroom = 1.0 - profile.risk_score / band.risk_cap;
    let beta_penalty = (config.beta_penalty_scale * (profile.beta - band.beta_cap).max(0.0))
        .min(config.beta_penalty_max);
    (headroom.clamp(-1.0, config.risk_vote_cap) - beta_penalty).clamp(-1.0, config.risk_vote_cap)
}

/// Weighted blend of the present votes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedScore {
    /// Normalized combined score in [-1, +1]
    pub score: f64,
    /// Whether two present votes pulled strongly in opposite directions
    pub conflict: bool,
}

/// Combine present votes under the style's weights, re-normalized so an
/// absent component shifts influence instead of dragging the score to zero
pub fn combine(votes: &VoteSet, style: InvestmentStyle, config: &SynthesisConfig) -> CombinedScore {
    let weights = config.weights_for(style);
    let pairs = [
        (votes.technical, weights.technical),
        (votes.sentiment, weights.sentiment),
        (votes.risk, weights.risk),
    ];

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut strongest = f64::NEG_INFINITY;
    let mut weakest = f64::INFINITY;

    for (vote, weight) in pairs {
        if let Some(value) = vote {
            weighted_sum += value * weight;
            total_weight += weight;
            strongest = strongest.max(value);
            weakest = weakest.min(value);
        }
    }

    if total_weight <= 0.0 {
        return CombinedScore {
            score: 0.0,
            conflict: false,
        };
    }

    CombinedScore {
        score: (weighted_sum / total_weight).clamp(-1.0, 1.0),
        conflict: strongest >= config.conflict_threshold
            && weakest <= -config.conflict_threshold,
    }
}

/// Everything the decide stage consumes, already collected and combined
pub struct DecisionInputs<'a> {
    pub combined: CombinedScore,
    pub current_price: f64,
    pub technical: Option<&'a TechnicalSnapshot>,
    pub sentiment: Option<&'a SentimentSummary>,
    pub risk: Option<&'a RiskProfile>,
    pub tolerance: RiskTolerance,
    pub warnings: Vec<String>,
}

impl DecisionInputs<'_> {
    fn missing_count(&self) -> usize {
        3 - usize::from(self.technical.is_some())
            - usize::from(self.sentiment.is_some())
            - usize::from(self.risk.is_some())
    }
}

/// Turn the combined score into an action, confidence, price levels, and a
/// deterministic rationale
pub fn decide(inputs: DecisionInputs<'_>, config: &SynthesisConfig) -> Recommendation {
    let score = inputs.combined.score;
    let action = if score >= config.decision_threshold {
        Action::Buy
    } else if score <= -config.decision_threshold {
        Action::Sell
    } else {
        Action::Hold
    };

    // Score magnitude rescaled into [0.5, 1.0], then discounted once per
    // absent component
    let missing = inputs.missing_count();
    let confidence = ((0.5 + score.abs() / 2.0)
        * config.missing_penalty.powi(missing as i32))
    .clamp(0.0, 1.0);

    let volatility = inputs
        .risk
        .map_or(config.fallback_volatility, |r| r.annualized_volatility);
    let current = inputs.current_price;
    let reach = confidence * (config.target_base + config.target_vol_scale * volatility);
    let cushion = (config.stop_base + config.stop_vol_scale * volatility).min(0.99);

    let (target_price, entry_price, stop_loss) = match action {
        Action::Buy => (current * (1.0 + reach), current, current * (1.0 - cushion)),
        Action::Sell => (current * (1.0 - reach), current, current * (1.0 + cushion)),
        Action::Hold => (current, current, current),
    };
    let expected_return = target_price / current - 1.0;

    let rationale = build_rationale(&inputs, action);

    Recommendation {
        action,
        confidence,
        target_price,
        entry_price,
        stop_loss,
        expected_return,
        rationale,
        warnings: inputs.warnings,
    }
}

/// One factual line per present component, in a fixed order; a hold born
/// from offsetting strong votes is named as such up front, without blaming
/// any single component
fn build_rationale(inputs: &DecisionInputs<'_>, action: Action) -> Vec<String> {
    let mut rationale = Vec::new();

    if action == Action::Hold && inputs.combined.conflict {
        rationale
            .push("conflicting signals: strong opposing votes offset each other".to_string());
    }
    if let Some(technical) = inputs.technical {
        let rsi = technical.rsi().unwrap_or(50.0);
        rationale.push(format!(
            "{} technical trend with RSI {rsi:.1}",
            technical.trend
        ));
    }
    if let Some(sentiment) = inputs.sentiment {
        rationale.push(format!(
            "{} sentiment (score {:+.2}) across {} news items",
            sentiment.category, sentiment.score, sentiment.item_count
        ));
    }
    if let Some(risk) = inputs.risk {
        rationale.push(format!(
            "{} risk level against {} tolerance (beta {:.2})",
            risk.level, inputs.tolerance, risk.beta
        ));
    }

    rationale
}

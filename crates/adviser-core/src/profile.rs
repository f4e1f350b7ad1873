//! User investment profile

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdviserError;

/// How much portfolio risk the user accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

/// How long the user intends to hold a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentHorizon {
    Short,
    #[default]
    Medium,
    Long,
}

/// How the combined score weighs the three signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStyle {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

/// Per-request user preferences shaping the recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub risk_tolerance: RiskTolerance,
    pub investment_horizon: InvestmentHorizon,
    pub investment_style: InvestmentStyle,
}

impl UserProfile {
    pub fn new(
        risk_tolerance: RiskTolerance,
        investment_horizon: InvestmentHorizon,
        investment_style: InvestmentStyle,
    ) -> Self {
        Self {
            risk_tolerance,
            investment_horizon,
            investment_style,
        }
    }
}

impl Display for RiskTolerance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(text)
    }
}

impl FromStr for RiskTolerance {
    type Err = AdviserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(AdviserError::Config(format!(
                "unknown risk tolerance '{other}', expected low, medium, or high"
            ))),
        }
    }
}

impl Display for InvestmentHorizon {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        };
        f.write_str(text)
    }
}

impl FromStr for InvestmentHorizon {
    type Err = AdviserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            other => Err(AdviserError::Config(format!(
                "unknown investment horizon '{other}', expected short, medium, or long"
            ))),
        }
    }
}

impl Display for InvestmentStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        };
        f.write_str(text)
    }
}

impl FromStr for InvestmentStyle {
    type Err = AdviserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(AdviserError::Config(format!(
                "unknown investment style '{other}', expected conservative, moderate, or aggressive"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_middle_values() {
        let profile = UserProfile::default();
        assert_eq!(profile.risk_tolerance, RiskTolerance::Medium);
        assert_eq!(profile.investment_horizon, InvestmentHorizon::Medium);
        assert_eq!(profile.investment_style, InvestmentStyle::Moderate);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(
            "High".parse::<RiskTolerance>().unwrap(),
            RiskTolerance::High
        );
        assert_eq!(
            " LONG ".parse::<InvestmentHorizon>().unwrap(),
            InvestmentHorizon::Long
        );
        assert!("reckless".parse::<InvestmentStyle>().is_err());
    }
}

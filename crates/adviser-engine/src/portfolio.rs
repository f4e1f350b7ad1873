//! Multi-symbol batches and the portfolio roll-up

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use adviser_core::error::Result;
use adviser_core::recommendation::{AnalysisReport, AnalyzeRequest};

use crate::synthesizer::DecisionSynthesizer;

impl DecisionSynthesizer {
    /// Analyze a batch of requests concurrently
    ///
    /// Results keep request order, one slot per request; a failed symbol
    /// occupies its slot as an error and never poisons the rest.
    pub async fn analyze_many(
        &self,
        requests: Vec<AnalyzeRequest>,
    ) -> Vec<Result<AnalysisReport>> {
        join_all(requests.into_iter().map(|request| self.analyze(request))).await
    }
}

/// Aggregate view over a batch of successful reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Number of reports rolled up
    pub analyzed: usize,
    /// Report count per recommended action
    pub actions: BTreeMap<String, usize>,
    /// Report count per risk level, for reports where risk was available
    pub risk_levels: BTreeMap<String, usize>,
    /// Mean recommendation confidence, 0.0 for an empty batch
    pub average_confidence: f64,
}

/// Roll reports up into per-action and per-risk-level counts plus a mean
/// confidence
pub fn summarize(reports: &[AnalysisReport]) -> PortfolioSummary {
    let mut actions = BTreeMap::new();
    let mut risk_levels = BTreeMap::new();
    let mut confidence_sum = 0.0;

    for report in reports {
        *actions
            .entry(report.recommendation.action.to_string())
            .or_insert(0) += 1;
        if let Some(risk) = &report.risk {
            *risk_levels.entry(risk.level.to_string()).or_insert(0) += 1;
        }
        confidence_sum += report.recommendation.confidence;
    }

    let average_confidence = if reports.is_empty() {
        0.0
    } else {
        confidence_sum / reports.len() as f64
    };

    PortfolioSummary {
        analyzed: reports.len(),
        actions,
        risk_levels,
        average_confidence,
    }
}

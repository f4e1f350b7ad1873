//! The decision synthesizer
//!
//! One `analyze` call runs a fixed four-stage pipeline: collect the price
//! anchor and the three component outputs, score each present component
//! into a directional vote, combine the votes under the profile's style
//! weights, and decide an action with price levels and a rationale. A
//! failed component degrades the report instead of failing the request;
//! only a missing price anchor or a full component blackout is fatal.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use uuid::Uuid;

use adviser_analysis::risk::RiskEvaluator;
use adviser_analysis::sentiment::SentimentAggregator;
use adviser_analysis::technical::TechnicalAnalyzer;
use adviser_core::error::{AdviserError, Result};
use adviser_core::recommendation::{AnalysisReport, AnalyzeRequest};
use adviser_core::series::PriceSeries;
use adviser_core::snapshot::{RiskProfile, SentimentSummary};
use adviser_core::symbol::Symbol;

use crate::config::AdviserConfig;
use crate::scoring::{self, DecisionInputs, VoteSet};
use crate::sources::SourceHub;

/// Runs the collect/score/combine/decide pipeline for analysis requests
///
/// Holds the fetch hub and one instance of each analysis component,
/// configured once at construction. Cheap to share behind an `Arc`; every
/// method takes `&self`.
pub struct DecisionSynthesizer {
    sources: SourceHub,
    technical: TechnicalAnalyzer,
    sentiment: SentimentAggregator,
    risk: RiskEvaluator,
    config: Arc<AdviserConfig>,
}

impl DecisionSynthesizer {
    /// Build a synthesizer over the given hub, wiring each component from
    /// its configuration section
    pub fn new(sources: SourceHub, config: Arc<AdviserConfig>) -> Self {
        Self {
            technical: TechnicalAnalyzer::new(config.technical.clone()),
            sentiment: SentimentAggregator::new(config.sentiment.clone()),
            risk: RiskEvaluator::new(config.risk.clone()),
            sources,
            config,
        }
    }

    /// Analyze one symbol into a full report
    ///
    /// Fails with `AnalysisUnavailable` when the price anchor cannot be
    /// fetched or when all three components are absent; any lesser
    /// degradation is folded into the report's warnings. Dropping the
    /// returned future cancels all in-flight fetches.
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisReport> {
        let AnalyzeRequest {
            symbol,
            profile,
            as_of,
        } = request;
        let request_id = Uuid::new_v4();
        let as_of = as_of.unwrap_or_else(Utc::now);
        tracing::info!(%request_id, %symbol, %as_of, "starting analysis");

        let synthesis = &self.config.synthesis;
        let series = self
            .sources
            .price_history(&symbol, synthesis.price_lookback_days, as_of)
            .await
            .map_err(|err| {
                tracing::warn!(%request_id, %symbol, error = %err, "price anchor unavailable");
                AdviserError::AnalysisUnavailable {
                    symbol: symbol.to_string(),
                    reason: format!("price history unavailable: {err}"),
                }
            })?;
        let current_price = series.last_close();
        tracing::debug!(%request_id, bars = series.len(), current_price, "price anchor ready");

        let budget = synthesis.component_timeout;
        let (technical, sentiment, risk) = tokio::join!(
            guarded("technical", budget, async { self.technical.analyze(&series) }),
            guarded("sentiment", budget, self.run_sentiment(&symbol, as_of)),
            guarded("risk", budget, self.run_risk(&series, as_of)),
        );

        let mut warnings = Vec::new();
        let technical = absorb("technical", technical, &mut warnings);
        let sentiment = match absorb("sentiment", sentiment, &mut warnings) {
            // Zero scored items carry no evidence; treat the summary as absent
            Some(summary) if summary.item_count == 0 => {
                tracing::warn!(%request_id, "no scored news items in the lookback window");
                warnings.push(
                    "sentiment analysis unavailable: no scored news items in the lookback window"
                        .to_string(),
                );
                None
            }
            other => other,
        };
        let risk = absorb("risk", risk, &mut warnings);

        if technical.is_none() && sentiment.is_none() && risk.is_none() {
            return Err(AdviserError::AnalysisUnavailable {
                symbol: symbol.to_string(),
                reason: warnings.join("; "),
            });
        }

        let votes = VoteSet::from_components(
            technical.as_ref(),
            sentiment.as_ref(),
            risk.as_ref(),
            profile.risk_tolerance,
            synthesis,
        );
        let combined = scoring::combine(&votes, profile.investment_style, synthesis);
        tracing::debug!(
            %request_id,
            score = combined.score,
            conflict = combined.conflict,
            present = votes.present_count(),
            "votes combined"
        );

        let recommendation = scoring::decide(
            DecisionInputs {
                combined,
                current_price,
                technical: technical.as_ref(),
                sentiment: sentiment.as_ref(),
                risk: risk.as_ref(),
                tolerance: profile.risk_tolerance,
                warnings,
            },
            synthesis,
        );
        tracing::info!(
            %request_id,
            %symbol,
            action = %recommendation.action,
            confidence = recommendation.confidence,
            "analysis complete"
        );

        Ok(AnalysisReport {
            symbol,
            as_of,
            current_price,
            recommendation,
            technical,
            sentiment,
            risk,
        })
    }

    async fn run_sentiment(
        &self,
        symbol: &Symbol,
        as_of: DateTime<Utc>,
    ) -> Result<SentimentSummary> {
        let items = self
            .sources
            .news(symbol, self.config.synthesis.news_lookback_hours, as_of)
            .await?;
        Ok(self.sentiment.aggregate(&items, as_of))
    }

    async fn run_risk(&self, series: &PriceSeries, as_of: DateTime<Utc>) -> Result<RiskProfile> {
        let index = self
            .sources
            .reference_index(self.config.synthesis.price_lookback_days, as_of)
            .await?;
        self.risk.evaluate(series, &index)
    }
}

/// Cap a component future at the configured wall-clock budget
async fn guarded<T>(
    component: &'static str,
    budget: Duration,
    task: impl Future<Output = Result<T>>,
) -> Result<T> {
    match timeout(budget, task).await {
        Ok(result) => result,
        Err(_) => Err(AdviserError::Timeout {
            component,
            timeout_secs: budget.as_secs(),
        }),
    }
}

/// Fold a component result into an optional output, recording failures as
/// one warning each
fn absorb<T>(component: &'static str, result: Result<T>, warnings: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(component, error = %err, "component degraded");
            warnings.push(format!("{component} analysis unavailable: {err}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adviser_core::profile::UserProfile;
    use adviser_core::providers::{MarketDataSource, NewsSource, ReferenceIndexSource};
    use adviser_core::recommendation::Action;
    use adviser_core::sentiment::SentimentItem;
    use adviser_core::series::Bar;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap()
    }

    fn series_from(closes: &[f64]) -> PriceSeries {
        let start = anchor() - ChronoDuration::days(closes.len() as i64);
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + ChronoDuration::days(i as i64 + 1),
                open: close * 0.998,
                high: close * 1.004,
                low: close * 0.994,
                close,
                volume: 1_000_000,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    /// Alternating up/down closes with an upward bias
    fn drifting_closes(bars: usize, up: f64, down: f64) -> Vec<f64> {
        let mut close = 100.0;
        let mut closes = Vec::with_capacity(bars);
        for i in 0..bars {
            close *= if i % 2 == 0 { up } else { down };
            closes.push(close);
        }
        closes
    }

    /// Index closes whose per-period returns are the asset's divided by
    /// `ratio`, so the asset's beta against the index is exactly `ratio`
    fn tracking_index(asset_closes: &[f64], ratio: f64) -> Vec<f64> {
        let mut closes = vec![4_000.0];
        for pair in asset_closes.windows(2) {
            let step = pair[1] / pair[0] - 1.0;
            let last = closes[closes.len() - 1];
            closes.push(last * (1.0 + step / ratio));
        }
        closes
    }

    fn fresh_items(as_of: DateTime<Utc>, count: usize) -> Vec<SentimentItem> {
        (0..count)
            .map(|i| {
                SentimentItem::new(
                    "market-wire",
                    as_of - ChronoDuration::hours(i as i64 + 1),
                    format!("quarterly outlook raised, note {i}"),
                    0.6,
                    0.8,
                )
            })
            .collect()
    }

    struct ScriptedMarket {
        series: PriceSeries,
    }

    #[async_trait]
    impl MarketDataSource for ScriptedMarket {
        async fn get_price_history(&self, _: &Symbol, _: u32) -> Result<PriceSeries> {
            Ok(self.series.clone())
        }
    }

    struct ScriptedNews {
        items: Vec<SentimentItem>,
    }

    #[async_trait]
    impl NewsSource for ScriptedNews {
        async fn get_news(&self, _: &Symbol, _: u32) -> Result<Vec<SentimentItem>> {
            Ok(self.items.clone())
        }
    }

    struct ScriptedIndex {
        series: PriceSeries,
    }

    #[async_trait]
    impl ReferenceIndexSource for ScriptedIndex {
        async fn get_reference_index(&self, _: u32) -> Result<PriceSeries> {
            Ok(self.series.clone())
        }
    }

    struct SleepyNews;

    #[async_trait]
    impl NewsSource for SleepyNews {
        async fn get_news(&self, _: &Symbol, _: u32) -> Result<Vec<SentimentItem>> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(vec![])
        }
    }

    /// Fails every endpoint with a transport error
    struct Failing;

    fn fetch_error(source: &str) -> AdviserError {
        AdviserError::Fetch {
            source: source.to_string(),
            reason: "connection refused".to_string(),
        }
    }

    #[async_trait]
    impl MarketDataSource for Failing {
        async fn get_price_history(&self, _: &Symbol, _: u32) -> Result<PriceSeries> {
            Err(fetch_error("price_history"))
        }
    }

    #[async_trait]
    impl NewsSource for Failing {
        async fn get_news(&self, _: &Symbol, _: u32) -> Result<Vec<SentimentItem>> {
            Err(fetch_error("news"))
        }
    }

    #[async_trait]
    impl ReferenceIndexSource for Failing {
        async fn get_reference_index(&self, _: u32) -> Result<PriceSeries> {
            Err(fetch_error("reference_index"))
        }
    }

    fn quick_config() -> AdviserConfig {
        let mut config = AdviserConfig::default();
        config.fetch.retry_backoff_base = Duration::from_millis(1);
        config
    }

    fn synthesizer_with(
        market: Arc<dyn MarketDataSource>,
        news: Arc<dyn NewsSource>,
        index: Arc<dyn ReferenceIndexSource>,
        config: AdviserConfig,
    ) -> DecisionSynthesizer {
        let config = Arc::new(config);
        let hub = SourceHub::new(market, news, index, config.fetch.clone());
        DecisionSynthesizer::new(hub, config)
    }

    fn request() -> AnalyzeRequest {
        AnalyzeRequest {
            symbol: Symbol::parse("AAPL").unwrap(),
            profile: UserProfile::default(),
            as_of: Some(anchor()),
        }
    }

    fn uptrend_market() -> (ScriptedMarket, ScriptedIndex) {
        let closes = drifting_closes(30, 1.016, 0.991);
        let index = tracking_index(&closes, 1.1);
        (
            ScriptedMarket {
                series: series_from(&closes),
            },
            ScriptedIndex {
                series: series_from(&index),
            },
        )
    }

    #[tokio::test]
    async fn uptrend_with_positive_news_recommends_a_buy() {
        let (market, index) = uptrend_market();
        let synthesizer = synthesizer_with(
            Arc::new(market),
            Arc::new(ScriptedNews {
                items: fresh_items(anchor(), 5),
            }),
            Arc::new(index),
            quick_config(),
        );

        let report = synthesizer.analyze(request()).await.unwrap();

        assert_eq!(report.recommendation.action, Action::Buy);
        assert_eq!(report.component_count(), 3);
        assert!(report.recommendation.warnings.is_empty());
        assert!(
            report.recommendation.confidence >= 0.6 && report.recommendation.confidence <= 0.9,
            "confidence was {}",
            report.recommendation.confidence
        );
        assert!(report.recommendation.prices_consistent(report.current_price));
        assert!(
            report
                .recommendation
                .rationale
                .iter()
                .any(|line| line.contains("bullish"))
        );
        assert!(
            report
                .recommendation
                .rationale
                .iter()
                .any(|line| line.contains("positive sentiment"))
        );
    }

    #[tokio::test]
    async fn an_empty_news_window_degrades_instead_of_failing() {
        let (market, index) = uptrend_market();
        let full_market = ScriptedMarket {
            series: market.series.clone(),
        };
        let full_index = ScriptedIndex {
            series: index.series.clone(),
        };

        let degraded = synthesizer_with(
            Arc::new(market),
            Arc::new(ScriptedNews { items: vec![] }),
            Arc::new(index),
            quick_config(),
        );
        let full = synthesizer_with(
            Arc::new(full_market),
            Arc::new(ScriptedNews {
                items: fresh_items(anchor(), 5),
            }),
            Arc::new(full_index),
            quick_config(),
        );

        let degraded_report = degraded.analyze(request()).await.unwrap();
        let full_report = full.analyze(request()).await.unwrap();

        assert!(degraded_report.sentiment.is_none());
        assert_eq!(degraded_report.component_count(), 2);
        assert_eq!(degraded_report.recommendation.warnings.len(), 1);
        assert!(degraded_report.recommendation.warnings[0].contains("sentiment"));
        assert!(
            degraded_report.recommendation.confidence < full_report.recommendation.confidence,
            "degraded {} should trail full {}",
            degraded_report.recommendation.confidence,
            full_report.recommendation.confidence
        );
    }

    #[tokio::test]
    async fn a_slow_component_is_cut_off_and_reported() {
        let (market, index) = uptrend_market();
        let mut config = quick_config();
        config.synthesis.component_timeout = Duration::from_millis(50);

        let synthesizer = synthesizer_with(
            Arc::new(market),
            Arc::new(SleepyNews),
            Arc::new(index),
            config,
        );

        let report = synthesizer.analyze(request()).await.unwrap();

        assert!(report.sentiment.is_none());
        assert_eq!(report.component_count(), 2);
        assert!(
            report
                .recommendation
                .warnings
                .iter()
                .any(|warning| warning.contains("timed out"))
        );
    }

    #[tokio::test]
    async fn fails_only_when_every_component_is_absent() {
        let closes = drifting_closes(30, 1.016, 0.991);
        let mut config = quick_config();
        // An anchor of 30 bars is below this floor, so the technical
        // component fails alongside the scripted news and index failures
        config.technical.min_bars = 40;

        let synthesizer = synthesizer_with(
            Arc::new(ScriptedMarket {
                series: series_from(&closes),
            }),
            Arc::new(Failing),
            Arc::new(Failing),
            config,
        );

        let err = synthesizer.analyze(request()).await.unwrap_err();
        match err {
            AdviserError::AnalysisUnavailable { symbol, reason } => {
                assert_eq!(symbol, "AAPL");
                assert!(reason.contains("technical"));
                assert!(reason.contains("sentiment"));
                assert!(reason.contains("risk"));
            }
            other => panic!("expected AnalysisUnavailable, got {other}"),
        }
    }

    #[tokio::test]
    async fn a_missing_price_anchor_fails_the_request() {
        let (_, index) = uptrend_market();
        let synthesizer = synthesizer_with(
            Arc::new(Failing),
            Arc::new(ScriptedNews {
                items: fresh_items(anchor(), 5),
            }),
            Arc::new(index),
            quick_config(),
        );

        let err = synthesizer.analyze(request()).await.unwrap_err();
        match err {
            AdviserError::AnalysisUnavailable { reason, .. } => {
                assert!(reason.contains("price history unavailable"));
            }
            other => panic!("expected AnalysisUnavailable, got {other}"),
        }
    }

    #[tokio::test]
    async fn identical_requests_produce_identical_reports() {
        let (market, index) = uptrend_market();
        let synthesizer = synthesizer_with(
            Arc::new(market),
            Arc::new(ScriptedNews {
                items: fresh_items(anchor(), 5),
            }),
            Arc::new(index),
            quick_config(),
        );

        let first = synthesizer.analyze(request()).await.unwrap();
        let second = synthesizer.analyze(request()).await.unwrap();

        assert_eq!(first, second);
        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }
}

//! Text rendering for reports and comparisons

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use adviser_core::recommendation::{Action, AnalysisReport};
use adviser_engine::portfolio::PortfolioSummary;

fn action_marker(action: Action) -> &'static str {
    match action {
        Action::Buy => "🟢",
        Action::Sell => "🔴",
        Action::Hold => "🟡",
    }
}

fn section_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Render one report as sectioned text
pub fn render_report(report: &AnalysisReport) -> String {
    let recommendation = &report.recommendation;
    let mut out = String::new();

    out.push_str(&format!(
        "{} {} {} ({:.0}% confidence)\n",
        action_marker(recommendation.action),
        report.symbol,
        recommendation.action.to_string().to_uppercase(),
        recommendation.confidence * 100.0
    ));
    out.push_str(&format!(
        "as of {} (sample data feed)\n\n",
        report.as_of.format("%Y-%m-%d %H:%M UTC")
    ));

    let mut levels = section_table();
    levels.set_header(vec!["Current", "Entry", "Target", "Stop loss", "Expected return"]);
    levels.add_row(vec![
        format!("{:.2}", report.current_price),
        format!("{:.2}", recommendation.entry_price),
        format!("{:.2}", recommendation.target_price),
        format!("{:.2}", recommendation.stop_loss),
        format!("{:+.1}%", recommendation.expected_return * 100.0),
    ]);
    out.push_str(&format!("{levels}\n"));

    out.push_str("\nRationale:\n");
    for line in &recommendation.rationale {
        out.push_str(&format!("  - {line}\n"));
    }
    if !recommendation.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &recommendation.warnings {
            out.push_str(&format!("  ! {warning}\n"));
        }
    }

    if let Some(technical) = &report.technical {
        out.push_str(&format!("\nTechnical ({} trend)\n", technical.trend));
        let mut table = section_table();
        table.set_header(vec!["Indicator", "Value"]);
        for (name, value) in &technical.indicators {
            table.add_row(vec![name.clone(), format!("{value:.2}")]);
        }
        if !technical.support.is_empty() {
            table.add_row(vec!["support".to_string(), join_levels(&technical.support)]);
        }
        if !technical.resistance.is_empty() {
            table.add_row(vec![
                "resistance".to_string(),
                join_levels(&technical.resistance),
            ]);
        }
        out.push_str(&format!("{table}\n"));
    }

    if let Some(sentiment) = &report.sentiment {
        out.push_str(&format!(
            "\nSentiment: {} (score {:+.2}, confidence {:.2}) from {} items, {} positive / {} negative / {} neutral\n",
            sentiment.category,
            sentiment.score,
            sentiment.confidence,
            sentiment.item_count,
            sentiment.positive_count,
            sentiment.negative_count,
            sentiment.neutral_count
        ));
    }

    if let Some(risk) = &report.risk {
        out.push_str(&format!(
            "\nRisk: {} (volatility {:.1}%, beta {:.2}, 1-day VaR {:.1}%, max drawdown {:.1}%)\n",
            risk.level,
            risk.annualized_volatility * 100.0,
            risk.beta,
            risk.var_95 * 100.0,
            risk.max_drawdown * 100.0
        ));
    }

    out
}

/// Render a comparison table plus the portfolio roll-up
pub fn render_comparison(
    reports: &[AnalysisReport],
    failures: &[(String, String)],
    summary: &PortfolioSummary,
) -> String {
    let mut out = String::new();

    let mut table = section_table();
    table.set_header(vec![
        "Symbol",
        "Action",
        "Confidence",
        "Price",
        "Target",
        "Risk",
    ]);
    for report in reports {
        let recommendation = &report.recommendation;
        table.add_row(vec![
            report.symbol.to_string(),
            format!(
                "{} {}",
                action_marker(recommendation.action),
                recommendation.action
            ),
            format!("{:.0}%", recommendation.confidence * 100.0),
            format!("{:.2}", report.current_price),
            format!("{:.2}", recommendation.target_price),
            report
                .risk
                .as_ref()
                .map_or("n/a".to_string(), |risk| risk.level.to_string()),
        ]);
    }
    out.push_str(&format!("{table}\n"));

    for (symbol, error) in failures {
        out.push_str(&format!("  ! {symbol}: {error}\n"));
    }

    out.push_str(&format!(
        "\n{} analyzed, average confidence {:.0}%",
        summary.analyzed,
        summary.average_confidence * 100.0
    ));
    for (action, count) in &summary.actions {
        out.push_str(&format!(", {count} {action}"));
    }
    out.push_str("\n(sample data feed)\n");

    out
}

fn join_levels(levels: &[f64]) -> String {
    levels
        .iter()
        .map(|level| format!("{level:.2}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use adviser_core::recommendation::Recommendation;
    use adviser_core::snapshot::{
        RiskLevel, RiskProfile, SentimentCategory, SentimentSummary, TechnicalSnapshot, Trend,
    };
    use adviser_core::symbol::Symbol;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn sample_report() -> AnalysisReport {
        let mut indicators = BTreeMap::new();
        indicators.insert("rsi".to_string(), 62.4);
        indicators.insert("ma_10".to_string(), 103.2);

        AnalysisReport {
            symbol: Symbol::parse("AAPL").unwrap(),
            as_of: Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap(),
            current_price: 105.0,
            recommendation: Recommendation {
                action: Action::Buy,
                confidence: 0.72,
                target_price: 113.4,
                entry_price: 105.0,
                stop_loss: 99.1,
                expected_return: 0.08,
                rationale: vec!["bullish technical trend with RSI 62.4".to_string()],
                warnings: vec!["risk analysis unavailable: thin overlap".to_string()],
            },
            technical: Some(TechnicalSnapshot {
                trend: Trend::Bullish,
                indicators,
                support: vec![98.2],
                resistance: vec![108.9],
            }),
            sentiment: Some(SentimentSummary {
                score: 0.55,
                category: SentimentCategory::Positive,
                confidence: 0.5,
                item_count: 4,
                positive_count: 3,
                negative_count: 1,
                neutral_count: 0,
            }),
            risk: Some(RiskProfile {
                annualized_volatility: 0.22,
                beta: 1.15,
                var_95: -0.018,
                max_drawdown: 0.09,
                risk_score: 0.1,
                level: RiskLevel::Low,
            }),
        }
    }

    #[test]
    fn report_rendering_covers_every_section() {
        let text = render_report(&sample_report());

        assert!(text.contains("🟢 AAPL BUY (72% confidence)"));
        assert!(text.contains("sample data feed"));
        assert!(text.contains("bullish technical trend with RSI 62.4"));
        assert!(text.contains("rsi"));
        assert!(text.contains("Warnings:"));
        assert!(text.contains("thin overlap"));
        assert!(text.contains("Sentiment: positive"));
        assert!(text.contains("Risk: low"));
    }

    #[test]
    fn comparison_rendering_lists_failures_and_counts() {
        let reports = vec![sample_report()];
        let failures = vec![(
            "MSFT".to_string(),
            "Analysis unavailable for MSFT: no data".to_string(),
        )];
        let summary = adviser_engine::portfolio::summarize(&reports);

        let text = render_comparison(&reports, &failures, &summary);

        assert!(text.contains("AAPL"));
        assert!(text.contains("! MSFT"));
        assert!(text.contains("1 analyzed"));
        assert!(text.contains("1 buy"));
        assert!(text.contains("sample data feed"));
    }
}

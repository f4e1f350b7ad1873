//! Command-line interface for adviser-rs
//!
//! Runs the decision synthesizer over the bundled offline data feed, so
//! every command works without network access or API keys. Reports render
//! as sectioned text by default or as JSON with `--json`.

mod render;

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use adviser_core::profile::{InvestmentHorizon, InvestmentStyle, RiskTolerance, UserProfile};
use adviser_core::recommendation::AnalyzeRequest;
use adviser_core::symbol::Symbol;
use adviser_engine::config::AdviserConfig;
use adviser_engine::portfolio;
use adviser_engine::sources::SourceHub;
use adviser_engine::synthesizer::DecisionSynthesizer;
use adviser_engine::synthetic::SyntheticFeed;

#[derive(Parser, Debug)]
#[command(name = "adviser")]
#[command(about = "Buy/sell/hold recommendations for stock symbols", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one symbol into a recommendation
    Analyze {
        /// Ticker symbol, e.g. AAPL
        symbol: String,

        /// Risk tolerance: low, medium, or high
        #[arg(long, default_value = "medium")]
        tolerance: RiskTolerance,

        /// Investment horizon: short, medium, or long
        #[arg(long, default_value = "medium")]
        horizon: InvestmentHorizon,

        /// Investment style: conservative, moderate, or aggressive
        #[arg(long, default_value = "moderate")]
        style: InvestmentStyle,

        /// Evaluation instant as RFC 3339, defaults to now
        #[arg(long)]
        as_of: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze several symbols and roll them up
    Compare {
        /// Ticker symbols, e.g. AAPL MSFT NVDA
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Risk tolerance: low, medium, or high
        #[arg(long, default_value = "medium")]
        tolerance: RiskTolerance,

        /// Investment horizon: short, medium, or long
        #[arg(long, default_value = "medium")]
        horizon: InvestmentHorizon,

        /// Investment style: conservative, moderate, or aggressive
        #[arg(long, default_value = "moderate")]
        style: InvestmentStyle,

        /// Evaluation instant as RFC 3339, defaults to now
        #[arg(long)]
        as_of: Option<String>,

        /// Print reports and summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        adviser_utils::init_tracing_with("debug");
    } else {
        adviser_utils::init_tracing();
    }
    tracing::debug!(command = ?cli.command, "dispatching");

    match cli.command {
        Commands::Analyze {
            symbol,
            tolerance,
            horizon,
            style,
            as_of,
            json,
        } => {
            let as_of = resolve_as_of(as_of.as_deref())?;
            let synthesizer = offline_synthesizer(as_of)?;
            let request = AnalyzeRequest {
                symbol: Symbol::parse(&symbol)?,
                profile: UserProfile::new(tolerance, horizon, style),
                as_of: Some(as_of),
            };

            let report = synthesizer.analyze(request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render::render_report(&report));
            }
        }

        Commands::Compare {
            symbols,
            tolerance,
            horizon,
            style,
            as_of,
            json,
        } => {
            let as_of = resolve_as_of(as_of.as_deref())?;
            let synthesizer = offline_synthesizer(as_of)?;
            let profile = UserProfile::new(tolerance, horizon, style);
            let requests = symbols
                .iter()
                .map(|raw| {
                    Ok(AnalyzeRequest {
                        symbol: Symbol::parse(raw)?,
                        profile,
                        as_of: Some(as_of),
                    })
                })
                .collect::<Result<Vec<_>, adviser_core::error::AdviserError>>()?;

            let results = synthesizer.analyze_many(requests).await;
            let mut reports = Vec::new();
            let mut failures = Vec::new();
            for (raw, result) in symbols.iter().zip(results) {
                match result {
                    Ok(report) => reports.push(report),
                    Err(err) => failures.push((raw.clone(), err.to_string())),
                }
            }
            let summary = portfolio::summarize(&reports);

            if json {
                let failures: Vec<_> = failures
                    .iter()
                    .map(|(symbol, error)| {
                        serde_json::json!({ "symbol": symbol, "error": error })
                    })
                    .collect();
                let payload = serde_json::json!({
                    "reports": reports,
                    "failures": failures,
                    "summary": summary,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", render::render_comparison(&reports, &failures, &summary));
            }
        }
    }

    Ok(())
}

/// Parse the --as-of flag, defaulting to now
fn resolve_as_of(raw: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match raw {
        Some(text) => {
            let parsed = DateTime::parse_from_rfc3339(text)
                .with_context(|| format!("invalid --as-of value '{text}', expected RFC 3339"))?;
            Ok(parsed.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}

/// Wire a synthesizer over the bundled offline feed
fn offline_synthesizer(as_of: DateTime<Utc>) -> anyhow::Result<DecisionSynthesizer> {
    let config = Arc::new(AdviserConfig::builder().build()?);
    let feed = SyntheticFeed::new(as_of);
    let hub = SourceHub::new(
        Arc::new(feed),
        Arc::new(feed),
        Arc::new(feed),
        config.fetch.clone(),
    );
    Ok(DecisionSynthesizer::new(hub, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_profile_flags() {
        let cli = Cli::parse_from([
            "adviser",
            "analyze",
            "AAPL",
            "--tolerance",
            "high",
            "--style",
            "aggressive",
        ]);
        match cli.command {
            Commands::Analyze {
                symbol,
                tolerance,
                horizon,
                style,
                ..
            } => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(tolerance, RiskTolerance::High);
                assert_eq!(horizon, InvestmentHorizon::Medium);
                assert_eq!(style, InvestmentStyle::Aggressive);
            }
            Commands::Compare { .. } => panic!("expected the analyze subcommand"),
        }
    }

    #[test]
    fn rejects_an_unknown_tolerance() {
        let result = Cli::try_parse_from(["adviser", "analyze", "AAPL", "--tolerance", "reckless"]);
        assert!(result.is_err());
    }

    #[test]
    fn compare_requires_at_least_one_symbol() {
        let result = Cli::try_parse_from(["adviser", "compare"]);
        assert!(result.is_err());
    }

    #[test]
    fn as_of_accepts_rfc3339_and_rejects_prose() {
        let parsed = resolve_as_of(Some("2024-06-03T00:00:00Z")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap());
        assert!(resolve_as_of(Some("yesterday")).is_err());
    }
}

//! Error types shared across the adviser workspace

use std::fmt;

/// Result type alias for adviser operations
pub type Result<T> = std::result::Result<T, AdviserError>;

/// Errors produced by validation, the analysis components, and the synthesizer
// Display/Error/From are written by hand because thiserror's derive treats any
// field named `source` as the error cause; here `Fetch.source` is the name of
// the upstream data source.
#[derive(Debug)]
pub enum AdviserError {
    /// Not enough data points for the requested computation
    InsufficientData {
        context: String,
        required: usize,
        actual: usize,
    },

    /// Input that is structurally valid but mathematically unusable
    DegenerateInput(String),

    /// Upstream data source failed after retries
    Fetch { source: String, reason: String },

    /// Every analysis component failed for the request
    AnalysisUnavailable { symbol: String, reason: String },

    /// A component exceeded its deadline
    Timeout {
        component: &'static str,
        timeout_secs: u64,
    },

    /// Invalid ticker symbol
    InvalidSymbol(String),

    /// Configuration error
    Config(String),

    /// JSON parsing error
    Json(serde_json::Error),
}

impl fmt::Display for AdviserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData {
                context,
                required,
                actual,
            } => write!(
                f,
                "Insufficient data for {context}: need at least {required} points, got {actual}"
            ),
            Self::DegenerateInput(detail) => write!(f, "Degenerate input: {detail}"),
            Self::Fetch { source, reason } => write!(f, "Fetch failed for {source}: {reason}"),
            Self::AnalysisUnavailable { symbol, reason } => {
                write!(f, "Analysis unavailable for {symbol}: {reason}")
            }
            Self::Timeout {
                component,
                timeout_secs,
            } => write!(f, "{component} analysis timed out after {timeout_secs}s"),
            Self::InvalidSymbol(symbol) => write!(f, "Invalid symbol: {symbol}"),
            Self::Config(detail) => write!(f, "Configuration error: {detail}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for AdviserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AdviserError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl AdviserError {
    /// Whether the fetch layer may retry the operation that produced this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

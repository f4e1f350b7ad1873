//! Validated ticker symbol newtype

use std::fmt::{self, Display, Formatter};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AdviserError;

static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9.\-]{0,9}$").expect("symbol pattern compiles"));

/// Normalized, validated ticker symbol
///
/// Input is trimmed and uppercased before validation, so `" aapl "`
/// normalizes to `AAPL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a ticker symbol
    pub fn parse(input: &str) -> Result<Self, AdviserError> {
        let normalized = input.trim().to_uppercase();
        if SYMBOL_PATTERN.is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(AdviserError::InvalidSymbol(input.to_string()))
        }
    }

    /// The normalized ticker text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = AdviserError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = AdviserError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

use regex::Regex;
use thiserror::Error;

use crate::model::SymbolCounts;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("statistics line '{0}:' not found in tool output")]
    MissingCount(&'static str),
    #[error("invalid statistics pattern: {0}")]
    Pattern(String),
    #[error("invalid count '{value}' for '{field}'")]
    InvalidCount { field: &'static str, value: String },
}

const TOTAL: &str = "Total symbols";
const EQUAL: &str = "Equal";
const NOT_EQUAL: &str = "Not equal";

/// Parse the `--report-stat` block of a compare run.
///
/// ```text
/// Total symbols: 5
/// Equal:         3 (60%)
/// Not equal:     2 (40%)
/// ```
pub fn parse_stat_summary(text: &str) -> Result<SymbolCounts, SummaryError> {
    Ok(SymbolCounts {
        total: capture_count(text, TOTAL)?,
        equal: capture_count(text, EQUAL)?,
        not_equal: capture_count(text, NOT_EQUAL)?,
    })
}

// Anchored at line start so `Equal:` never matches inside `Not equal:`.
fn capture_count(text: &str, field: &'static str) -> Result<u64, SummaryError> {
    let pattern = format!(r"(?m)^\s*{}:\s*(\d+)", regex::escape(field));
    let re = Regex::new(&pattern).map_err(|e| SummaryError::Pattern(e.to_string()))?;
    let caps = re.captures(text).ok_or(SummaryError::MissingCount(field))?;
    let value = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    value
        .parse()
        .map_err(|_| SummaryError::InvalidCount { field, value: value.to_string() })
}

//! Result classification: turns a comparison outcome into a verdict and
//! checks it against the expected label.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::IgnoreRules;
use crate::model::{BenchmarkType, ComparisonOutcome, FunctionSets, Label, Verdict};
use crate::services::details::DetailsError;
use crate::services::summary::SummaryError;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("unparsable tool summary: {0}")]
    Summary(#[from] SummaryError),
    #[error("mixed outcome but no per-function details were provided")]
    MissingFunctionDetails,
    #[error("per-function details unavailable: {0}")]
    Details(#[from] DetailsError),
}

/// Computed verdict and whether it matches the expected label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: Verdict,
    pub correct: bool,
}

/// Classify one comparison outcome.
///
/// Exact count matches decide `Eq`/`Neq` directly. Otherwise the per-function
/// sets decide, after dropping the functions `ignore` lists for `key` (only
/// for aggregated cases). A verdict that keeps both equal and not-equal
/// functions is mixed and never equals a binary label.
pub fn classify(
    outcome: &ComparisonOutcome,
    expected: Label,
    key: &str,
    benchmark_type: BenchmarkType,
    ignore: &IgnoreRules,
) -> Result<Classification, ClassifyError> {
    let counts = outcome.counts;
    let verdict = if counts.total == counts.equal {
        Verdict::Eq
    } else if counts.total == counts.not_equal {
        Verdict::Neq
    } else {
        let functions = outcome.functions.as_ref().ok_or(ClassifyError::MissingFunctionDetails)?;
        let ignored = match benchmark_type {
            BenchmarkType::Aggregated => ignore.get(key),
            _ => None,
        };
        resolve_mixed(functions, ignored)
    };
    let correct = verdict == Verdict::from(expected);
    Ok(Classification { verdict, correct })
}

fn resolve_mixed(functions: &FunctionSets, ignored: Option<&BTreeSet<String>>) -> Verdict {
    let keep = |name: &&String| ignored.map_or(true, |set| !set.contains(*name));
    let neq: BTreeSet<&String> = functions.neq.iter().filter(keep).collect();
    let all: BTreeSet<&String> = functions.all.iter().filter(keep).collect();
    let eq: Vec<String> = all.difference(&neq).map(|s| s.to_string()).collect();

    if neq.is_empty() {
        Verdict::Eq
    } else if eq.is_empty() {
        Verdict::Neq
    } else {
        Verdict::Mixed { eq, neq: neq.into_iter().cloned().collect() }
    }
}

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Serialize;

use crate::model::{BenchmarkType, Label, ResultRow};

/// The part of a row that two runs are compared on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowProjection {
    pub benchmark_type: BenchmarkType,
    pub benchmark: String,
    pub program: String,
    pub expected: Label,
    pub result: String,
    pub correct: bool,
}

impl From<&ResultRow> for RowProjection {
    fn from(row: &ResultRow) -> Self {
        Self {
            benchmark_type: row.benchmark_type,
            benchmark: row.benchmark.clone(),
            program: row.program.clone(),
            expected: row.expected,
            result: row.result.clone(),
            correct: row.correct,
        }
    }
}

/// Symmetric difference of two result sets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResultDiff {
    pub only_in_left: Vec<RowProjection>,
    pub only_in_right: Vec<RowProjection>,
}

impl ResultDiff {
    pub fn is_empty(&self) -> bool {
        self.only_in_left.is_empty() && self.only_in_right.is_empty()
    }

    pub fn render_text(&self, left_name: &str, right_name: &str) -> String {
        let mut out = String::new();
        for (name, rows) in [(left_name, &self.only_in_left), (right_name, &self.only_in_right)] {
            let _ = writeln!(out, "Only in {} ({}):", name, rows.len());
            if rows.is_empty() {
                out.push_str("  (none)\n");
            }
            for r in rows {
                let _ = writeln!(
                    out,
                    "  - [{}] {}/{} expected={} result={} correct={}",
                    r.benchmark_type, r.benchmark, r.program, r.expected, r.result, r.correct
                );
            }
        }
        out
    }
}

pub fn diff_results(left: &[ResultRow], right: &[ResultRow]) -> ResultDiff {
    let left: BTreeSet<RowProjection> = left.iter().map(RowProjection::from).collect();
    let right: BTreeSet<RowProjection> = right.iter().map(RowProjection::from).collect();
    ResultDiff {
        only_in_left: left.difference(&right).cloned().collect(),
        only_in_right: right.difference(&left).cloned().collect(),
    }
}

//! Aggregation and reporting over result rows.
//!
//! - `Tally` / `SummaryTable`: correctness counts per benchmark type.
//! - `csv`: the `;`-delimited result table, written incrementally.
//! - `diff`: set difference between two result tables.

pub mod csv;
pub mod diff;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::model::{BenchmarkType, Label, ResultRow};

/// Correctness counts for one group of rows.
///
/// Failed cases are counted only in `failed`, never as correct or incorrect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    pub eq_correct: usize,
    pub eq_incorrect: usize,
    pub neq_correct: usize,
    pub neq_incorrect: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, row: &ResultRow) {
        if row.failure().is_some() {
            self.failed += 1;
            return;
        }
        match (row.expected, row.correct) {
            (Label::Eq, true) => self.eq_correct += 1,
            (Label::Eq, false) => self.eq_incorrect += 1,
            (Label::Neq, true) => self.neq_correct += 1,
            (Label::Neq, false) => self.neq_incorrect += 1,
        }
    }

    pub fn correct(&self) -> usize {
        self.eq_correct + self.neq_correct
    }

    pub fn incorrect(&self) -> usize {
        self.eq_incorrect + self.neq_incorrect
    }

    pub fn total(&self) -> usize {
        self.correct() + self.incorrect() + self.failed
    }

    fn add(&mut self, other: &Tally) {
        self.eq_correct += other.eq_correct;
        self.eq_incorrect += other.eq_incorrect;
        self.neq_correct += other.neq_correct;
        self.neq_incorrect += other.neq_incorrect;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub benchmark_type: BenchmarkType,
    pub tally: Tally,
}

/// Per-benchmark-type tallies, always listing every type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub entries: Vec<TallyEntry>,
    pub total: Tally,
}

impl SummaryTable {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let mut entries: Vec<TallyEntry> = BenchmarkType::ALL
            .iter()
            .map(|t| TallyEntry { benchmark_type: *t, tally: Tally::default() })
            .collect();
        for row in rows {
            if let Some(entry) = entries.iter_mut().find(|e| e.benchmark_type == row.benchmark_type)
            {
                entry.tally.record(row);
            }
        }
        let mut total = Tally::default();
        for entry in &entries {
            total.add(&entry.tally);
        }
        Self { entries, total }
    }

    pub fn get(&self, benchmark_type: BenchmarkType) -> Tally {
        self.entries
            .iter()
            .find(|e| e.benchmark_type == benchmark_type)
            .map(|e| e.tally)
            .unwrap_or_default()
    }

    /// Render as a GitHub-flavored markdown table with a closing total row.
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(
            "| Type | Eq correct | Eq incorrect | Neq correct | Neq incorrect | Failed | Total |\n",
        );
        out.push_str("|------|-----------:|-------------:|------------:|--------------:|-------:|------:|\n");
        let lines = self
            .entries
            .iter()
            .map(|e| (e.benchmark_type.as_str(), &e.tally))
            .chain(std::iter::once(("total", &self.total)));
        for (name, t) in lines {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} | {} |",
                name,
                t.eq_correct,
                t.eq_incorrect,
                t.neq_correct,
                t.neq_incorrect,
                t.failed,
                t.total()
            );
        }
        out
    }
}

/// Overall correctness of one sweep configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub configuration: String,
    pub total: Tally,
}

/// Compare configurations side by side.
pub fn render_sweep_markdown(entries: &[SweepEntry]) -> String {
    let mut out = String::new();
    out.push_str("| Configuration | Correct | Incorrect | Failed | Total |\n");
    out.push_str("|---------------|--------:|----------:|-------:|------:|\n");
    for entry in entries {
        let t = &entry.total;
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            entry.configuration.replace('|', "\\|"),
            t.correct(),
            t.incorrect(),
            t.failed,
            t.total()
        );
    }
    out
}

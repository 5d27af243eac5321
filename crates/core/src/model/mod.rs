//! Core data model: benchmark cases, labels, verdicts, and result rows.
//!
//! Everything here is a plain value type. Discovery, tool invocation, and
//! classification live in their own modules and only exchange these types.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Expected (or computed binary) outcome of comparing two program versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Eq,
    Neq,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Eq => "Eq",
            Label::Neq => "Neq",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Eq" => Ok(Label::Eq),
            "Neq" => Ok(Label::Neq),
            other => Err(format!("Invalid label '{}'. Allowed: Eq, Neq", other)),
        }
    }
}

/// How a case relates the compared function to the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BenchmarkType {
    /// No designated function; every function of the program is evaluated.
    Aggregated,
    /// The compared function is the one that changed.
    FunctionLevel,
    /// An unchanged function calling the changed one is compared instead.
    ProgramLevel,
}

impl BenchmarkType {
    pub const ALL: [BenchmarkType; 3] =
        [BenchmarkType::Aggregated, BenchmarkType::FunctionLevel, BenchmarkType::ProgramLevel];

    pub fn as_str(self) -> &'static str {
        match self {
            BenchmarkType::Aggregated => "aggregated",
            BenchmarkType::FunctionLevel => "function-level",
            BenchmarkType::ProgramLevel => "program-level",
        }
    }
}

impl fmt::Display for BenchmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BenchmarkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aggregated" => Ok(BenchmarkType::Aggregated),
            "function-level" => Ok(BenchmarkType::FunctionLevel),
            "program-level" => Ok(BenchmarkType::ProgramLevel),
            other => Err(format!(
                "Invalid benchmark type '{}'. Allowed: aggregated, function-level, program-level",
                other
            )),
        }
    }
}

/// A single semantic change recorded in a program descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "change type")]
    pub change_type: String,
    #[serde(rename = "change operation")]
    pub operation: String,
}

/// Per-program metadata loaded from the sidecar descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDescriptor {
    pub function_to_compare: String,
    pub program_level_function: Option<String>,
    pub changes: Vec<Change>,
}

impl ProgramDescriptor {
    /// Render the change list as `type: operation` entries joined by `, `.
    pub fn changes_description(&self) -> String {
        self.changes
            .iter()
            .map(|c| format!("{}: {}", c.change_type, c.operation))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One old/new program pair discovered in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchmarkCase {
    pub benchmark: String,
    pub program: String,
    pub expected: Label,
    /// Path of the case directory relative to the corpus root, `/`-separated.
    pub key: String,
    pub old_source: PathBuf,
    pub new_source: PathBuf,
    pub descriptor: Option<ProgramDescriptor>,
}

impl BenchmarkCase {
    pub fn benchmark_type(&self) -> BenchmarkType {
        match &self.descriptor {
            None => BenchmarkType::Aggregated,
            Some(d) if d.program_level_function.is_some() => BenchmarkType::ProgramLevel,
            Some(_) => BenchmarkType::FunctionLevel,
        }
    }

    /// Function the comparison is scoped to; `None` compares the whole snapshot.
    pub fn compared_function(&self) -> Option<&str> {
        let descriptor = self.descriptor.as_ref()?;
        Some(
            descriptor
                .program_level_function
                .as_deref()
                .unwrap_or(&descriptor.function_to_compare),
        )
    }

    pub fn changes_description(&self) -> String {
        self.descriptor.as_ref().map(|d| d.changes_description()).unwrap_or_default()
    }
}

/// Symbol counts reported by the tool's textual statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymbolCounts {
    pub total: u64,
    pub equal: u64,
    pub not_equal: u64,
}

impl SymbolCounts {
    /// True when neither "all equal" nor "all not equal" holds.
    pub fn is_mixed(&self) -> bool {
        self.total != self.equal && self.total != self.not_equal
    }
}

/// Per-function detail needed to resolve a mixed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionSets {
    /// Functions the tool reported as not equal.
    pub neq: BTreeSet<String>,
    /// Every function listed in the old snapshot.
    pub all: BTreeSet<String>,
}

/// Everything the classifier looks at for one case.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub counts: SymbolCounts,
    pub functions: Option<FunctionSets>,
}

/// Computed result of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Eq,
    Neq,
    Mixed { eq: Vec<String>, neq: Vec<String> },
}

impl From<Label> for Verdict {
    fn from(label: Label) -> Self {
        match label {
            Label::Eq => Verdict::Eq,
            Label::Neq => Verdict::Neq,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Eq => f.write_str("Eq"),
            Verdict::Neq => f.write_str("Neq"),
            Verdict::Mixed { eq, neq } => write!(
                f,
                "{} Eq [{}], {} Neq [{}]",
                eq.len(),
                eq.join(","),
                neq.len(),
                neq.join(",")
            ),
        }
    }
}

/// Stage at which a case failed before producing a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    BuildFailed,
    CompareFailed,
    ClassifyFailed,
    TimedOut,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::BuildFailed => "BuildFailed",
            FailureKind::CompareFailed => "CompareFailed",
            FailureKind::ClassifyFailed => "ClassifyFailed",
            FailureKind::TimedOut => "TimedOut",
        }
    }

    /// Recognize a failure token in a result column.
    pub fn from_result(result: &str) -> Option<Self> {
        match result {
            "BuildFailed" => Some(FailureKind::BuildFailed),
            "CompareFailed" => Some(FailureKind::CompareFailed),
            "ClassifyFailed" => Some(FailureKind::ClassifyFailed),
            "TimedOut" => Some(FailureKind::TimedOut),
            _ => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the result table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultRow {
    pub benchmark_type: BenchmarkType,
    pub benchmark: String,
    pub program: String,
    pub expected: Label,
    pub result: String,
    pub correct: bool,
    pub changes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_src: Option<String>,
}

impl ResultRow {
    /// Row for a case that produced a verdict.
    pub fn classified(case: &BenchmarkCase, verdict: &Verdict, correct: bool) -> Self {
        Self::base(case, verdict.to_string(), correct)
    }

    /// Row for a case that failed; never counted as correct.
    pub fn failed(case: &BenchmarkCase, kind: FailureKind) -> Self {
        Self::base(case, kind.to_string(), false)
    }

    fn base(case: &BenchmarkCase, result: String, correct: bool) -> Self {
        Self {
            benchmark_type: case.benchmark_type(),
            benchmark: case.benchmark.clone(),
            program: case.program.clone(),
            expected: case.expected,
            result,
            correct,
            changes: case.changes_description(),
            old_src: None,
            new_src: None,
        }
    }

    pub fn with_sources(mut self, case: &BenchmarkCase) -> Self {
        self.old_src = Some(case.old_source.display().to_string());
        self.new_src = Some(case.new_source.display().to_string());
        self
    }

    pub fn failure(&self) -> Option<FailureKind> {
        FailureKind::from_result(&self.result)
    }
}

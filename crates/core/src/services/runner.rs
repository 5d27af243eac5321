use std::fs;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{config_hash, CaseDirs, OutputLayout, RunConfig};
use crate::model::{BenchmarkCase, ComparisonOutcome, FailureKind, ResultRow};
use crate::report::csv::ResultWriter;
use crate::report::SummaryTable;
use crate::services::classify::{classify, Classification, ClassifyError};
use crate::services::details::load_function_sets;
use crate::services::summary::parse_stat_summary;
use crate::services::tool::{BuildRequest, CompareRequest, EquivalenceTool, ToolError};

/// What happened to one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseOutcome {
    Classified { outcome: ComparisonOutcome, classification: Classification },
    Failed { kind: FailureKind, message: String },
}

/// Outcome of one case together with its result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    pub key: String,
    pub outcome: CaseOutcome,
    pub row: ResultRow,
}

/// Options controlling how cases are scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Worker threads; 1 runs cases sequentially in discovery order.
    pub jobs: usize,
    /// Abort the whole run on the first failed case instead of recording it.
    pub fail_fast: bool,
    /// Append `old_src`/`new_src` columns to the result table.
    pub add_src_paths: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { jobs: 1, fail_fast: false, add_src_paths: false }
    }
}

#[derive(Debug)]
struct CaseFailure {
    kind: FailureKind,
    message: String,
}

impl CaseFailure {
    fn tool(stage: FailureKind, err: ToolError) -> Self {
        let kind = if err.is_timeout() { FailureKind::TimedOut } else { stage };
        Self { kind, message: err.to_string() }
    }

    fn classify(err: ClassifyError) -> Self {
        Self { kind: FailureKind::ClassifyFailed, message: err.to_string() }
    }
}

/// Parse compare output into an outcome, loading per-function details only
/// when the counts are mixed.
pub fn resolve_outcome(stdout: &str, dirs: &CaseDirs) -> Result<ComparisonOutcome, ClassifyError> {
    let counts = parse_stat_summary(stdout)?;
    let functions = if counts.is_mixed() {
        Some(load_function_sets(&dirs.old_snapshot, &dirs.compare_result)?)
    } else {
        None
    };
    Ok(ComparisonOutcome { counts, functions })
}

/// Builds, compares, and classifies benchmark cases.
pub struct BenchmarkRunner<'a> {
    pub tool: &'a dyn EquivalenceTool,
    pub config: &'a RunConfig,
    pub layout: &'a OutputLayout,
    pub options: RunOptions,
}

impl BenchmarkRunner<'_> {
    /// Run a single case; failures are captured in the report, never returned.
    pub fn run_case(&self, case: &BenchmarkCase) -> CaseReport {
        let outcome = match self.execute(case) {
            Ok((outcome, classification)) => CaseOutcome::Classified { outcome, classification },
            Err(failure) => {
                warn!(case = %case.key, kind = %failure.kind, error = %failure.message, "case failed");
                CaseOutcome::Failed { kind: failure.kind, message: failure.message }
            }
        };
        let row = match &outcome {
            CaseOutcome::Classified { classification, .. } => {
                ResultRow::classified(case, &classification.verdict, classification.correct)
            }
            CaseOutcome::Failed { kind, .. } => ResultRow::failed(case, *kind),
        };
        let row = if self.options.add_src_paths { row.with_sources(case) } else { row };
        info!(
            case = %case.key,
            expected = %row.expected,
            result = %row.result,
            correct = row.correct,
            "case finished"
        );
        CaseReport { key: case.key.clone(), outcome, row }
    }

    fn execute(
        &self,
        case: &BenchmarkCase,
    ) -> Result<(ComparisonOutcome, Classification), CaseFailure> {
        let dirs = self.layout.case_dirs(&case.key);
        let builds = [
            (&case.old_source, &dirs.old_snapshot, "build-old"),
            (&case.new_source, &dirs.new_snapshot, "build-new"),
        ];
        for (source, snapshot, stage) in builds {
            let request = BuildRequest {
                source: source.clone(),
                output_dir: snapshot.clone(),
                options: self.config.build.clone(),
                log_prefix: dirs.log_prefix(stage),
            };
            self.tool
                .build(&request)
                .map_err(|e| CaseFailure::tool(FailureKind::BuildFailed, e))?;
        }

        let request = CompareRequest {
            old_snapshot: dirs.old_snapshot.clone(),
            new_snapshot: dirs.new_snapshot.clone(),
            output_dir: dirs.compare_result.clone(),
            options: self.config.compare.clone(),
            function: case.compared_function().map(str::to_string),
            log_prefix: dirs.log_prefix("compare"),
        };
        let output = self
            .tool
            .compare(&request)
            .map_err(|e| CaseFailure::tool(FailureKind::CompareFailed, e))?;

        let outcome = resolve_outcome(&output.stdout, &dirs).map_err(CaseFailure::classify)?;
        let classification = classify(
            &outcome,
            case.expected,
            &case.key,
            case.benchmark_type(),
            &self.config.ignore,
        )
        .map_err(CaseFailure::classify)?;
        Ok((outcome, classification))
    }

    /// Run every case, handing each row to `on_row` as soon as it is ready.
    ///
    /// Reports come back in the order of `cases` regardless of `jobs`.
    pub fn run<F>(&self, cases: &[BenchmarkCase], on_row: F) -> Result<Vec<CaseReport>>
    where
        F: Fn(&ResultRow) -> Result<()> + Sync,
    {
        let process = |case: &BenchmarkCase| -> Result<CaseReport> {
            let report = self.run_case(case);
            on_row(&report.row)?;
            if self.options.fail_fast {
                if let CaseOutcome::Failed { kind, message } = &report.outcome {
                    return Err(anyhow!("Case {} failed ({}): {}", case.key, kind, message));
                }
            }
            Ok(report)
        };

        if self.options.jobs <= 1 {
            return cases.iter().map(process).collect();
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .build()
            .context("Failed to start worker pool")?;
        pool.install(|| cases.par_iter().map(process).collect())
    }
}

/// Metadata persisted as `run.json` next to the result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub runner_version: String,
    pub tool: String,
    pub tool_version: Option<String>,
    pub config_hash: String,
    pub started_at: String,
    pub finished_at: String,
    pub cases: usize,
    pub failed: usize,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct SuiteResult {
    pub reports: Vec<CaseReport>,
    pub summary: SummaryTable,
    pub metadata: RunMetadata,
}

/// Run all cases into `layout`: results CSV, summary table, and run metadata.
pub fn run_suite(
    tool: &dyn EquivalenceTool,
    config: &RunConfig,
    layout: &OutputLayout,
    cases: &[BenchmarkCase],
    options: RunOptions,
) -> Result<SuiteResult> {
    fs::create_dir_all(&layout.root)
        .with_context(|| format!("Failed to create output dir {}", layout.root.display()))?;
    let started_at = Utc::now().to_rfc3339();
    let writer = Mutex::new(ResultWriter::create(&layout.results_csv, options.add_src_paths)?);

    info!(cases = cases.len(), jobs = options.jobs, output = %layout.root.display(), "starting run");
    let runner = BenchmarkRunner { tool, config, layout, options };
    let reports = runner.run(cases, |row| {
        writer.lock().map_err(|_| anyhow!("Results writer poisoned"))?.write_row(row)
    })?;

    let rows: Vec<ResultRow> = reports.iter().map(|r| r.row.clone()).collect();
    let summary = SummaryTable::from_rows(&rows);
    fs::write(&layout.summary_md, summary.render_markdown()).with_context(|| {
        format!("Failed to write summary at {}", layout.summary_md.display())
    })?;
    fs::write(&layout.summary_json, serde_json::to_string_pretty(&summary)?).with_context(|| {
        format!("Failed to write summary at {}", layout.summary_json.display())
    })?;

    let metadata = RunMetadata {
        runner_version: crate::version().to_string(),
        tool: tool.name().to_string(),
        tool_version: tool.version(),
        config_hash: config_hash(config)?,
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        cases: reports.len(),
        failed: summary.total.failed,
    };
    fs::write(&layout.run_metadata, serde_json::to_string_pretty(&metadata)?).with_context(|| {
        format!("Failed to write run metadata at {}", layout.run_metadata.display())
    })?;
    info!(
        cases = metadata.cases,
        correct = summary.total.correct(),
        failed = metadata.failed,
        "run finished"
    );

    Ok(SuiteResult { reports, summary, metadata })
}

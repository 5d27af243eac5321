use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use eqbench_core::config::{load_run_config_or_default, OutputLayout, RunConfig};
use eqbench_core::corpus::discover_cases;
use eqbench_core::model::BenchmarkCase;
use tracing::warn;

use crate::canonicalize_or_current;

/// Options shared by every command that runs the checker over a corpus.
#[derive(Args, Debug, Clone, Default)]
pub struct CorpusArgs {
    /// Root of the benchmark corpus (`<benchmark>/<program>/<Eq|Neq>/`).
    #[arg(long)]
    pub benchmarks: String,

    /// Output directory for snapshots, compare results, and reports.
    #[arg(long)]
    pub output: String,

    /// Optional run config (YAML, or JSON by extension).
    #[arg(long)]
    pub config: Option<String>,

    /// Path to the checker executable (overrides config and DIFFKEMP_BIN).
    #[arg(long)]
    pub tool: Option<String>,

    /// Only run cases of these benchmarks.
    #[arg(long = "benchmark")]
    pub only_benchmarks: Vec<String>,

    /// Number of cases processed in parallel.
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,

    /// Abort on the first failed case instead of recording it.
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Kill a tool invocation after this many seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Add old_src/new_src columns to the result table.
    #[arg(long, default_value_t = false)]
    pub add_src_paths: bool,

    /// Overwrite an existing output directory.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

/// Load the config named on the command line (defaults when absent) and
/// apply the tool overrides common to all corpus commands.
pub fn load_config(args: &CorpusArgs) -> Result<RunConfig> {
    let mut config = load_run_config_or_default(args.config.as_deref().map(Path::new))?;
    if let Some(tool) = &args.tool {
        config.tool.path = Some(PathBuf::from(tool));
    }
    if args.timeout.is_some() {
        config.tool.timeout_secs = args.timeout;
    }
    Ok(config)
}

/// Discover cases, keeping only the requested benchmarks when any are given.
pub fn load_cases(benchmarks: &str, config: &RunConfig, only: &[String]) -> Result<Vec<BenchmarkCase>> {
    let root = canonicalize_or_current(benchmarks)?;
    let mut cases = discover_cases(&root, &config.corpus)?;
    if !only.is_empty() {
        cases.retain(|c| only.iter().any(|b| b == &c.benchmark));
    }
    if cases.is_empty() {
        return Err(anyhow!("No benchmark cases found under {}", root.display()));
    }
    Ok(cases)
}

/// Resolve the output directory, refusing to clobber a previous run unless forced.
///
/// The output may never be the corpus root or one of its ancestors, since a
/// forced run clears it.
pub fn prepare_output(output: &str, force: bool, benchmarks: &str) -> Result<OutputLayout> {
    let root = canonicalize_or_current(output)?;
    let corpus_root = canonicalize_or_current(benchmarks)?;
    if corpus_root.starts_with(&root) {
        return Err(anyhow!(
            "Output directory {} contains the benchmark corpus {}; choose a separate output",
            root.display(),
            corpus_root.display()
        ));
    }
    let has_content = root.is_dir()
        && fs::read_dir(&root)
            .with_context(|| format!("Failed to read {}", root.display()))?
            .next()
            .is_some();
    if has_content {
        if force {
            warn!(output = %root.display(), "removing previous run output");
            fs::remove_dir_all(&root).with_context(|| {
                format!("Failed to clean existing output dir {}", root.display())
            })?;
        } else {
            return Err(anyhow!(
                "Output already exists at {} (rerun with --force to overwrite)",
                root.display()
            ));
        }
    }
    fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create output dir {}", root.display()))?;
    Ok(OutputLayout::new(root))
}

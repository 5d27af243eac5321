use anyhow::Result;
use clap::Args;
use eqbench_core::config::RunConfig;
use eqbench_core::services::runner::{run_suite, RunOptions, SuiteResult};
use eqbench_core::services::DiffKempTool;

use crate::commands::{load_cases, load_config, prepare_output, CorpusArgs};

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Extra compiler option for snapshot builds (repeatable).
    #[arg(long = "clang-append", allow_hyphen_values = true)]
    pub clang_append: Vec<String>,

    /// Keep the compiler's own optimization level.
    #[arg(long, default_value_t = false)]
    pub no_opt_override: bool,

    /// LLVM pass to run over built snapshots (repeatable).
    #[arg(long = "pass")]
    pub passes: Vec<String>,

    /// Compare without any built-in code patterns.
    #[arg(long, default_value_t = false)]
    pub disable_patterns: bool,
}

impl RunArgs {
    /// Flags given on the command line win over the config file.
    pub fn apply_to(&self, config: &mut RunConfig) {
        if !self.clang_append.is_empty() {
            config.build.clang_append = self.clang_append.clone();
        }
        if self.no_opt_override {
            config.build.no_opt_override = true;
        }
        if !self.passes.is_empty() {
            config.build.passes = self.passes.clone();
        }
        if self.disable_patterns {
            config.compare.disable_patterns = true;
        }
    }
}

pub fn run_options(corpus: &CorpusArgs) -> RunOptions {
    RunOptions {
        jobs: corpus.jobs.max(1),
        fail_fast: corpus.fail_fast,
        add_src_paths: corpus.add_src_paths,
    }
}

/// Run the whole corpus once and print the summary table.
pub fn run_command(args: &RunArgs) -> Result<SuiteResult> {
    let mut config = load_config(&args.corpus)?;
    args.apply_to(&mut config);
    let cases = load_cases(&args.corpus.benchmarks, &config, &args.corpus.only_benchmarks)?;
    let layout = prepare_output(&args.corpus.output, args.corpus.force, &args.corpus.benchmarks)?;
    let tool = DiffKempTool::from_config(&config.tool);

    let suite = run_suite(&tool, &config, &layout, &cases, run_options(&args.corpus))?;

    println!("{}", suite.summary.render_markdown());
    println!("Cases: {} (failed: {})", suite.metadata.cases, suite.metadata.failed);
    println!("Results: {}", layout.results_csv.display());
    println!("Summary: {}", layout.summary_md.display());
    Ok(suite)
}

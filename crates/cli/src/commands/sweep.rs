use anyhow::{anyhow, Result};
use clap::Args;
use eqbench_core::config::SweepConfiguration;
use eqbench_core::report::{render_sweep_markdown, SweepEntry};
use eqbench_core::services::sweep::run_sweep;
use eqbench_core::services::DiffKempTool;

use crate::commands::{load_cases, load_config, prepare_output, run_options, CorpusArgs};

#[derive(Args, Debug, Clone, Default)]
pub struct SweepArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Only run the named configurations (repeatable).
    #[arg(long = "only")]
    pub only: Vec<String>,
}

/// Keep the configurations named in `only`, in their configured order.
pub fn select_configurations(
    all: Vec<SweepConfiguration>,
    only: &[String],
) -> Result<Vec<SweepConfiguration>> {
    if only.is_empty() {
        return Ok(all);
    }
    if let Some(unknown) = only.iter().find(|name| !all.iter().any(|c| &c.name == *name)) {
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        return Err(anyhow!("Unknown sweep configuration '{}' (available: {:?})", unknown, names));
    }
    Ok(all.into_iter().filter(|c| only.contains(&c.name)).collect())
}

/// Run the corpus through every sweep configuration.
pub fn sweep_command(args: &SweepArgs) -> Result<Vec<SweepEntry>> {
    let config = load_config(&args.corpus)?;
    let configurations = select_configurations(config.sweep_configurations(), &args.only)?;
    let cases = load_cases(&args.corpus.benchmarks, &config, &args.corpus.only_benchmarks)?;
    let layout = prepare_output(&args.corpus.output, args.corpus.force, &args.corpus.benchmarks)?;
    let tool = DiffKempTool::from_config(&config.tool);

    let entries =
        run_sweep(&tool, &config, &layout, &cases, &configurations, &run_options(&args.corpus))?;

    println!("{}", render_sweep_markdown(&entries));
    println!("Sweep summary: {}", layout.sweep_summary().display());
    Ok(entries)
}

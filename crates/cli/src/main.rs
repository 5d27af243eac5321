use anyhow::Result;
use clap::{Parser, Subcommand};
use eqbench_runner::commands::{
    diff_command, init_config_command, list_cases_command, run_command, summary_command,
    sweep_command, RunArgs, SweepArgs,
};
use tracing_subscriber::EnvFilter;

/// Equivalence-checker benchmark runner.
///
/// This CLI is a thin wrapper around `eqbench-core` (exposed in code as `eqbench_core`).
/// All substantive logic lives in the library so it can be tested thoroughly.
#[derive(Parser, Debug)]
#[command(
    name = "eqbench-runner",
    version,
    about = "Run an equivalence checker over a benchmark corpus and score its answers",
    long_about = None
)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build, compare, and classify every case of a corpus.
    ///
    /// Writes `results.csv`, `summary.md`, `summary.json`, and `run.json`
    /// into the output directory.
    Run(RunArgs),

    /// Run the corpus once per sweep configuration, each into its own subdirectory.
    Sweep(SweepArgs),

    /// Show rows that differ between two result CSVs.
    Diff {
        /// Left-hand result CSV.
        left: String,

        /// Right-hand result CSV.
        right: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Recompute the per-type summary table from a result CSV.
    Summary {
        /// Result CSV written by `run`.
        results: String,

        /// Emit JSON instead of a markdown table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the cases discovered in a corpus.
    ListCases {
        /// Root of the benchmark corpus.
        #[arg(long)]
        benchmarks: String,

        /// Optional run config (for corpus file names).
        #[arg(long)]
        config: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write a default run config.
    InitConfig {
        /// Destination file (YAML, or JSON by extension).
        #[arg(long, default_value = "eqbench.yaml")]
        path: String,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => {
            run_command(&args)?;
        }
        Command::Sweep(args) => {
            sweep_command(&args)?;
        }
        Command::Diff { left, right, json } => {
            diff_command(&left, &right, json)?;
        }
        Command::Summary { results, json } => {
            summary_command(&results, json)?;
        }
        Command::ListCases { benchmarks, config, json } => {
            list_cases_command(&benchmarks, config.as_deref(), json)?;
        }
        Command::InitConfig { path, force } => init_config_command(&path, force)?,
    }

    Ok(())
}

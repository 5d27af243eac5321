use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{OutputLayout, RunConfig, SweepConfiguration};
use crate::model::BenchmarkCase;
use crate::report::{render_sweep_markdown, SweepEntry};
use crate::services::runner::{run_suite, RunOptions};
use crate::services::tool::EquivalenceTool;

/// Run the corpus once per configuration, each into its own subdirectory,
/// then write a side-by-side `sweep.md`.
pub fn run_sweep(
    tool: &dyn EquivalenceTool,
    base: &RunConfig,
    layout: &OutputLayout,
    cases: &[BenchmarkCase],
    configurations: &[SweepConfiguration],
    options: &RunOptions,
) -> Result<Vec<SweepEntry>> {
    for sweep in configurations {
        sweep.validate_name()?;
    }
    let mut entries = Vec::new();
    for sweep in configurations {
        info!(configuration = %sweep.name, "sweep configuration");
        let child = layout.sweep_child(&sweep.name);
        let config = base.for_sweep(sweep);
        let suite = run_suite(tool, &config, &child, cases, options.clone())
            .with_context(|| format!("Sweep configuration '{}' failed", sweep.name))?;
        entries.push(SweepEntry { configuration: sweep.name.clone(), total: suite.summary.total });
    }

    fs::create_dir_all(&layout.root)
        .with_context(|| format!("Failed to create output dir {}", layout.root.display()))?;
    fs::write(layout.sweep_summary(), render_sweep_markdown(&entries)).with_context(|| {
        format!("Failed to write sweep summary at {}", layout.sweep_summary().display())
    })?;
    Ok(entries)
}

use std::path::Path;

use anyhow::Result;
use eqbench_core::report::csv::read_results;
use eqbench_core::report::SummaryTable;

/// Recompute the summary table from an existing result CSV.
pub fn summary_command(results: &str, json: bool) -> Result<SummaryTable> {
    let rows = read_results(Path::new(results))?;
    let summary = SummaryTable::from_rows(&rows);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.render_markdown());
    }
    Ok(summary)
}

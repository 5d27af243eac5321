use std::path::Path;

use anyhow::Result;
use eqbench_core::report::csv::read_results;
use eqbench_core::report::diff::{diff_results, ResultDiff};

/// Show rows that differ between two result tables.
pub fn diff_command(left: &str, right: &str, json: bool) -> Result<ResultDiff> {
    let left_rows = read_results(Path::new(left))?;
    let right_rows = read_results(Path::new(right))?;
    let diff = diff_results(&left_rows, &right_rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else if diff.is_empty() {
        println!("No differences.");
    } else {
        print!("{}", diff.render_text(left, right));
    }
    Ok(diff)
}

use std::path::Path;

use anyhow::Result;
use eqbench_core::config::load_run_config_or_default;
use serde::Serialize;

use crate::commands::load_cases;

#[derive(Debug, Serialize)]
pub struct CaseInfo {
    pub key: String,
    pub benchmark_type: String,
    pub expected: String,
    pub function: Option<String>,
    pub changes: String,
}

/// List the cases discovered under a corpus root.
pub fn list_cases_command(
    benchmarks: &str,
    config: Option<&str>,
    json: bool,
) -> Result<Vec<CaseInfo>> {
    let config = load_run_config_or_default(config.map(Path::new))?;
    let cases = load_cases(benchmarks, &config, &[])?;
    let infos: Vec<CaseInfo> = cases
        .iter()
        .map(|c| CaseInfo {
            key: c.key.clone(),
            benchmark_type: c.benchmark_type().to_string(),
            expected: c.expected.to_string(),
            function: c.compared_function().map(str::to_string),
            changes: c.changes_description(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(infos);
    }

    println!("Cases ({}):", infos.len());
    for info in &infos {
        match &info.function {
            Some(f) => println!("  - {} [{}, {}] function={}", info.key, info.benchmark_type, info.expected, f),
            None => println!("  - {} [{}, {}]", info.key, info.benchmark_type, info.expected),
        }
    }
    Ok(infos)
}

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::config::RunConfig;

/// Load a run config from YAML or JSON, chosen by file extension.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read run config at {}", path.display()))?;
    let config: RunConfig = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&body).context("Failed to parse run config JSON")?
    } else {
        serde_yaml::from_str(&body).context("Failed to parse run config YAML")?
    };
    config.validate().with_context(|| format!("Invalid run config at {}", path.display()))?;
    Ok(config)
}

/// Load the config at `path` when given, otherwise use defaults.
pub fn load_run_config_or_default(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(p) => load_run_config(p),
        None => Ok(RunConfig::default()),
    }
}

/// SHA-256 of the config's canonical JSON form, recorded with each run.
pub fn config_hash(config: &RunConfig) -> Result<String> {
    let json = serde_json::to_vec(config).context("Failed to serialize run config")?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(format!("{:x}", hasher.finalize()))
}

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use eqbench_core::config::RunConfig;

/// Write a default run config (with the built-in sweep spelled out).
pub fn init_config_command(path: &str, force: bool) -> Result<()> {
    let path = Path::new(path);
    if path.exists() && !force {
        return Err(anyhow!(
            "Config already exists at {} (rerun with --force to overwrite)",
            path.display()
        ));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    let config = RunConfig::with_default_sweep();
    let body = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::to_string_pretty(&config).context("Failed to serialize run config")?
    } else {
        serde_yaml::to_string(&config).context("Failed to serialize run config")?
    };
    fs::write(path, body)
        .with_context(|| format!("Failed to write run config at {}", path.display()))?;

    println!("Wrote run config: {}", path.display());
    Ok(())
}

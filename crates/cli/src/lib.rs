pub mod commands;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Canonicalize a path if possible, falling back to the given string
/// relative to the current working directory.
pub fn canonicalize_or_current(root: &str) -> Result<PathBuf> {
    let path = Path::new(root);
    if path == Path::new(".") {
        Ok(env::current_dir().context("Failed to get current directory")?)
    } else {
        // Output directories may not exist yet; anchor them at the cwd.
        match path.canonicalize() {
            Ok(p) => Ok(p),
            Err(_) => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                Ok(cwd.join(path))
            }
        }
    }
}

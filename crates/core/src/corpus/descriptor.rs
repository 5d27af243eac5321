use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{Change, ProgramDescriptor};

#[derive(Debug, Deserialize)]
struct DescriptorFile {
    #[serde(rename = "function name")]
    function_name: String,
    #[serde(rename = "program name", default)]
    program_name: Option<String>,
    #[serde(default)]
    changes: Vec<Change>,
}

/// Split `program.inner` into its inner (program-level) function, if any.
pub fn program_level_function(program_name: &str) -> Option<String> {
    program_name
        .split_once('.')
        .map(|(_, inner)| inner.trim())
        .filter(|inner| !inner.is_empty())
        .map(str::to_string)
}

/// Parse descriptor JSON.
pub fn parse_descriptor(body: &str) -> Result<ProgramDescriptor, serde_json::Error> {
    let raw: DescriptorFile = serde_json::from_str(body)?;
    Ok(ProgramDescriptor {
        function_to_compare: raw.function_name,
        program_level_function: raw.program_name.as_deref().and_then(program_level_function),
        changes: raw.changes,
    })
}

/// Load the descriptor at `path`.
///
/// A missing or malformed file means the case is aggregated, so both yield
/// `None` rather than an error.
pub fn load_descriptor(path: &Path) -> Option<ProgramDescriptor> {
    let body = match fs::read_to_string(path) {
        Ok(body) => body,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no program descriptor; treating as aggregated");
            return None;
        }
    };
    match parse_descriptor(&body) {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed program descriptor; treating as aggregated");
            None
        }
    }
}

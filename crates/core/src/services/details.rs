use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::model::FunctionSets;

/// Symbol listing written into every snapshot directory.
pub const SNAPSHOT_LISTING: &str = "snapshot.yaml";
/// Structured per-function report written into the compare output directory.
pub const COMPARE_REPORT: &str = "diffkemp-out.yaml";

#[derive(Debug, Error)]
pub enum DetailsError {
    #[error("required file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotListing {
    Many(Vec<SnapshotDoc>),
    One(SnapshotDoc),
}

#[derive(Debug, Deserialize)]
struct SnapshotDoc {
    #[serde(default)]
    list: Option<Vec<SnapshotEntry>>,
}

#[derive(Debug, Deserialize)]
struct SnapshotEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CompareReport {
    #[serde(default)]
    results: Option<Vec<CompareResult>>,
}

#[derive(Debug, Deserialize)]
struct CompareResult {
    function: String,
}

fn read_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, DetailsError> {
    if !path.is_file() {
        return Err(DetailsError::Missing(path.to_path_buf()));
    }
    let body = fs::read_to_string(path)
        .map_err(|e| DetailsError::Read { path: path.to_path_buf(), message: e.to_string() })?;
    serde_yaml::from_str(&body)
        .map_err(|e| DetailsError::Parse { path: path.to_path_buf(), message: e.to_string() })
}

/// Every function name listed in a snapshot.
pub fn load_snapshot_functions(snapshot_dir: &Path) -> Result<BTreeSet<String>, DetailsError> {
    let docs = match read_yaml::<SnapshotListing>(&snapshot_dir.join(SNAPSHOT_LISTING))? {
        SnapshotListing::Many(docs) => docs,
        SnapshotListing::One(doc) => vec![doc],
    };
    Ok(docs.into_iter().flat_map(|d| d.list.unwrap_or_default()).map(|e| e.name).collect())
}

/// Functions the compare report lists as not equal.
pub fn load_not_equal_functions(result_dir: &Path) -> Result<BTreeSet<String>, DetailsError> {
    let report: CompareReport = read_yaml(&result_dir.join(COMPARE_REPORT))?;
    Ok(report.results.unwrap_or_default().into_iter().map(|r| r.function).collect())
}

/// Function sets used to resolve a mixed outcome.
pub fn load_function_sets(
    old_snapshot: &Path,
    result_dir: &Path,
) -> Result<FunctionSets, DetailsError> {
    Ok(FunctionSets {
        neq: load_not_equal_functions(result_dir)?,
        all: load_snapshot_functions(old_snapshot)?,
    })
}

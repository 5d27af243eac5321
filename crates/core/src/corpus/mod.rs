//! Corpus discovery: finds old/new program pairs and their descriptors.
//!
//! A case is any directory containing both the old and the new source file.
//! Its path relative to the corpus root is `<benchmark>/<program...>/<Eq|Neq>`.

mod descriptor;

pub use descriptor::*;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::warn;

use crate::config::CorpusConfig;
use crate::model::{BenchmarkCase, Label};

/// Discover every case under `root`, sorted by key.
pub fn discover_cases(root: &Path, corpus: &CorpusConfig) -> Result<Vec<BenchmarkCase>> {
    if !root.is_dir() {
        return Err(anyhow!("Benchmark directory does not exist: {}", root.display()));
    }
    let mut case_dirs = Vec::new();
    collect_case_dirs(root, corpus, &mut case_dirs)?;

    let mut cases = Vec::new();
    for dir in case_dirs {
        if let Some(case) = case_from_dir(root, &dir, corpus) {
            cases.push(case);
        }
    }
    cases.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(cases)
}

fn collect_case_dirs(dir: &Path, corpus: &CorpusConfig, out: &mut Vec<PathBuf>) -> Result<()> {
    if dir.join(&corpus.old_source).is_file() && dir.join(&corpus.new_source).is_file() {
        out.push(dir.to_path_buf());
        return Ok(());
    }
    let mut children = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            children.push(entry.path());
        }
    }
    children.sort();
    for child in children {
        collect_case_dirs(&child, corpus, out)?;
    }
    Ok(())
}

fn case_from_dir(root: &Path, dir: &Path, corpus: &CorpusConfig) -> Option<BenchmarkCase> {
    let rel = dir.strip_prefix(root).ok()?;
    let parts: Vec<String> =
        rel.components().map(|c| c.as_os_str().to_string_lossy().to_string()).collect();
    if parts.len() < 3 {
        warn!(dir = %dir.display(), "case directory must be <benchmark>/<program>/<Eq|Neq>; skipping");
        return None;
    }
    let expected: Label = match parts[parts.len() - 1].parse() {
        Ok(label) => label,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "case directory does not end in a label; skipping");
            return None;
        }
    };

    Some(BenchmarkCase {
        benchmark: parts[0].clone(),
        program: parts[1..parts.len() - 1].join("/"),
        expected,
        key: parts.join("/"),
        old_source: dir.join(&corpus.old_source),
        new_source: dir.join(&corpus.new_source),
        descriptor: load_descriptor(&dir.join(&corpus.descriptor)),
    })
}

//! Run configuration, output layout, and config loading helpers.

mod layout;
mod util;

pub use layout::*;
pub use util::*;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when no tool path is configured.
pub const TOOL_PATH_ENV: &str = "DIFFKEMP_BIN";

/// How to locate and bound the external equivalence checker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Path to the checker executable. Falls back to `DIFFKEMP_BIN`, then `diffkemp`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Path to LLVM `opt`, used only when extra passes are requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opt_path: Option<PathBuf>,
    /// Per-invocation timeout in seconds; no bound when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ToolConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .or_else(|| std::env::var_os(TOOL_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("diffkemp"))
    }

    pub fn resolved_opt_path(&self) -> PathBuf {
        self.opt_path.clone().unwrap_or_else(|| PathBuf::from("opt"))
    }
}

/// File names that make up a case directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub old_source: String,
    pub new_source: String,
    pub descriptor: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            old_source: "oldV.c".to_string(),
            new_source: "newV.c".to_string(),
            descriptor: "info.json".to_string(),
        }
    }
}

/// Options passed to every snapshot build.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Extra compiler options, each forwarded as `--clang-append=OPT`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clang_append: Vec<String>,
    pub no_opt_override: bool,
    /// LLVM passes run over the snapshot's modules after the build.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub passes: Vec<String>,
}

/// Options passed to every comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    pub disable_patterns: bool,
}

/// Functions to drop from per-function classification, keyed by case key.
///
/// Only consulted for aggregated cases: the listed functions are untouched by
/// the change and unreachable from changed code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnoreRules(BTreeMap<String, BTreeSet<String>>);

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, key: impl Into<String>, functions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.entry(key.into()).or_default().extend(functions.into_iter().map(Into::into));
        self
    }

    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One named configuration of a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfiguration {
    pub name: String,
    #[serde(default)]
    pub build: BuildOptions,
    #[serde(default)]
    pub compare: CompareOptions,
}

impl SweepConfiguration {
    fn new(name: &str, build: BuildOptions, disable_patterns: bool) -> Self {
        Self { name: name.to_string(), build, compare: CompareOptions { disable_patterns } }
    }

    /// The name becomes a directory under the sweep output, so it must be a
    /// single plain path component.
    pub fn validate_name(&self) -> Result<()> {
        let name = self.name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(anyhow!(
                "Invalid sweep configuration name '{}': must be a plain directory name",
                name
            ));
        }
        Ok(())
    }
}

/// Built-in sweep: default build, full optimization, and custom passes, each
/// with and without pattern matching.
pub fn default_sweep() -> Vec<SweepConfiguration> {
    let o2 = BuildOptions {
        clang_append: vec!["-O2".to_string()],
        no_opt_override: true,
        passes: vec![],
    };
    let passes = BuildOptions {
        clang_append: vec![],
        no_opt_override: false,
        passes: vec!["mem2reg".to_string(), "simplifycfg".to_string()],
    };
    vec![
        SweepConfiguration::new("default", BuildOptions::default(), false),
        SweepConfiguration::new("default-no-patterns", BuildOptions::default(), true),
        SweepConfiguration::new("O2", o2.clone(), false),
        SweepConfiguration::new("O2-no-patterns", o2, true),
        SweepConfiguration::new("passes", passes.clone(), false),
        SweepConfiguration::new("passes-no-patterns", passes, true),
    ]
}

/// Complete configuration for a benchmark run.
///
/// Typically stored as YAML (`eqbench.yaml`) next to the corpus; every field
/// has a default so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub tool: ToolConfig,
    pub corpus: CorpusConfig,
    pub build: BuildOptions,
    pub compare: CompareOptions,
    #[serde(skip_serializing_if = "IgnoreRules::is_empty")]
    pub ignore: IgnoreRules,
    /// Sweep configurations; the built-in set is used when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sweep: Vec<SweepConfiguration>,
}

impl RunConfig {
    /// Configuration with the built-in sweep spelled out, as written by `init-config`.
    pub fn with_default_sweep() -> Self {
        Self { sweep: default_sweep(), ..Self::default() }
    }

    /// The sweep configurations to run, falling back to the built-in set.
    pub fn sweep_configurations(&self) -> Vec<SweepConfiguration> {
        if self.sweep.is_empty() {
            default_sweep()
        } else {
            self.sweep.clone()
        }
    }

    /// Check every configured sweep name.
    pub fn validate(&self) -> Result<()> {
        self.sweep.iter().try_for_each(SweepConfiguration::validate_name)
    }

    /// Copy of this config with build/compare options replaced by a sweep entry.
    pub fn for_sweep(&self, sweep: &SweepConfiguration) -> Self {
        Self {
            build: sweep.build.clone(),
            compare: sweep.compare.clone(),
            sweep: vec![],
            ..self.clone()
        }
    }
}

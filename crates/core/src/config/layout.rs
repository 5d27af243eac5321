use std::path::{Path, PathBuf};

/// Logical layout of a run's output directory.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    /// Root directory of the run output.
    pub root: PathBuf,
    /// Incrementally written result table.
    pub results_csv: PathBuf,
    /// Markdown summary table.
    pub summary_md: PathBuf,
    /// Machine-readable summary.
    pub summary_json: PathBuf,
    /// Run metadata (timestamps, config hash, tool version).
    pub run_metadata: PathBuf,
    /// Per-case working directories (snapshots, compare results, logs).
    pub cases_dir: PathBuf,
}

/// Working directories of a single case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDirs {
    pub root: PathBuf,
    pub old_snapshot: PathBuf,
    pub new_snapshot: PathBuf,
    pub compare_result: PathBuf,
}

impl CaseDirs {
    /// Prefix for the captured output of one tool invocation; the streams
    /// land in `<stage>.out` and `<stage>.err`.
    pub fn log_prefix(&self, stage: &str) -> PathBuf {
        self.root.join(stage)
    }
}

impl OutputLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            results_csv: root.join("results.csv"),
            summary_md: root.join("summary.md"),
            summary_json: root.join("summary.json"),
            run_metadata: root.join("run.json"),
            cases_dir: root.join("cases"),
            root,
        }
    }

    /// Working directories for the case with the given key.
    ///
    /// Keys are relative paths, so cases never share a directory.
    pub fn case_dirs(&self, key: &str) -> CaseDirs {
        let root = key.split('/').fold(self.cases_dir.clone(), |acc, part| acc.join(part));
        CaseDirs {
            old_snapshot: root.join("old"),
            new_snapshot: root.join("new"),
            compare_result: root.join("result"),
            root,
        }
    }

    /// Layout for one configuration of a sweep rooted here.
    pub fn sweep_child(&self, configuration: &str) -> OutputLayout {
        OutputLayout::new(self.root.join(configuration))
    }

    /// Cross-configuration summary written by a sweep.
    pub fn sweep_summary(&self) -> PathBuf {
        self.root.join("sweep.md")
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::config::ToolConfig;
use crate::services::tool::{
    run_captured, BuildRequest, CompareOutput, CompareRequest, EquivalenceTool, ToolError,
};

/// DiffKemp-backed checker that shells out to `diffkemp build` / `diffkemp compare`.
#[derive(Debug, Clone)]
pub struct DiffKempTool {
    pub path: PathBuf,
    pub opt_path: PathBuf,
    pub timeout: Option<Duration>,
}

impl DiffKempTool {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            path: config.resolved_path(),
            opt_path: config.resolved_opt_path(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    fn build_command(&self, request: &BuildRequest) -> Command {
        let mut cmd = Command::new(&self.path);
        cmd.arg("build");
        for opt in &request.options.clang_append {
            cmd.arg(format!("--clang-append={opt}"));
        }
        if request.options.no_opt_override {
            cmd.arg("--no-opt-override");
        }
        cmd.arg(&request.source).arg(&request.output_dir);
        cmd
    }

    fn compare_command(&self, request: &CompareRequest) -> Command {
        let mut cmd = Command::new(&self.path);
        cmd.arg("compare");
        if request.options.disable_patterns {
            cmd.arg("--disable-all-patterns");
        }
        cmd.arg(&request.old_snapshot)
            .arg(&request.new_snapshot)
            .arg("-o")
            .arg(&request.output_dir)
            .arg("--report-stat");
        if let Some(function) = &request.function {
            cmd.arg("--function").arg(function);
        }
        cmd
    }

    /// Run the requested LLVM passes in place over every module of a snapshot.
    fn run_passes(&self, request: &BuildRequest) -> Result<(), ToolError> {
        let pipeline = format!("-passes={}", request.options.passes.join(","));
        let mut modules = Vec::new();
        collect_llvm_modules(&request.output_dir, &mut modules)?;
        modules.sort();
        for (idx, module) in modules.iter().enumerate() {
            let mut cmd = Command::new(&self.opt_path);
            cmd.arg("-S").arg(&pipeline).arg(module).arg("-o").arg(module);
            let prefix = with_suffix(&request.log_prefix, &format!("-opt-{idx}"));
            run_captured(cmd, &prefix, self.timeout)?;
        }
        Ok(())
    }
}

impl EquivalenceTool for DiffKempTool {
    fn build(&self, request: &BuildRequest) -> Result<(), ToolError> {
        if !request.source.is_file() {
            return Err(ToolError::MissingSource(request.source.clone()));
        }
        clear_dir(&request.output_dir)?;
        run_captured(self.build_command(request), &request.log_prefix, self.timeout)?;
        if !request.options.passes.is_empty() {
            self.run_passes(request)?;
        }
        Ok(())
    }

    fn compare(&self, request: &CompareRequest) -> Result<CompareOutput, ToolError> {
        clear_dir(&request.output_dir)?;
        let stdout =
            run_captured(self.compare_command(request), &request.log_prefix, self.timeout)?;
        Ok(CompareOutput { stdout })
    }

    fn name(&self) -> &str {
        "diffkemp"
    }

    fn version(&self) -> Option<String> {
        let output = Command::new(&self.path).arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let first = stdout.lines().next().unwrap_or("").trim();
        if first.is_empty() {
            None
        } else {
            Some(first.to_string())
        }
    }
}

/// The tool refuses to write into existing directories; start from a clean slate.
fn clear_dir(dir: &Path) -> Result<(), ToolError> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .map_err(|e| ToolError::Io(format!("failed to clean {}: {e}", dir.display())))?;
    }
    if let Some(parent) = dir.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ToolError::Io(format!("failed to create {}: {e}", parent.display())))?;
    }
    Ok(())
}

fn collect_llvm_modules(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ToolError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ToolError::Io(format!("failed to read {}: {e}", dir.display())))?;
    for entry in entries {
        let path = entry.map_err(|e| ToolError::Io(e.to_string()))?.path();
        if path.is_dir() {
            collect_llvm_modules(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("ll") {
            out.push(path);
        }
    }
    Ok(())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::config::{BuildOptions, CompareOptions};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Request to build one program version into a snapshot directory.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub options: BuildOptions,
    /// Where stdout/stderr of the build are captured (`<log_prefix>.out/.err`).
    pub log_prefix: PathBuf,
}

/// Request to compare two snapshots.
#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub old_snapshot: PathBuf,
    pub new_snapshot: PathBuf,
    pub output_dir: PathBuf,
    pub options: CompareOptions,
    /// Restrict the comparison to one function; whole snapshot when `None`.
    pub function: Option<String>,
    pub log_prefix: PathBuf,
}

/// Captured result of a successful comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOutput {
    /// Textual report printed by the tool (statistics included).
    pub stdout: String,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Source file not found at {0}")]
    MissingSource(PathBuf),
    #[error("failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },
    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: String },
    #[error("`{command}` timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },
    #[error("tool IO error: {0}")]
    Io(String),
}

impl ToolError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ToolError::TimedOut { .. })
    }
}

/// External equivalence checker: builds snapshots and compares them.
pub trait EquivalenceTool: Send + Sync {
    fn build(&self, request: &BuildRequest) -> Result<(), ToolError>;
    fn compare(&self, request: &CompareRequest) -> Result<CompareOutput, ToolError>;
    fn name(&self) -> &str;
    /// Best-effort version string for run metadata.
    fn version(&self) -> Option<String> {
        None
    }
}

/// Run `command` to completion, capturing stdout and stderr into
/// `<log_prefix>.out` / `<log_prefix>.err`, and return stdout.
///
/// With a timeout the child is polled and killed once the budget is spent.
pub fn run_captured(
    mut command: Command,
    log_prefix: &Path,
    timeout: Option<Duration>,
) -> Result<String, ToolError> {
    let command_line = format_command(&command);
    let program = command.get_program().to_string_lossy().to_string();
    let out_path = log_prefix.with_extension("out");
    let err_path = log_prefix.with_extension("err");
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ToolError::Io(format!("failed to create {}: {e}", parent.display())))?;
    }
    let stdout_file = File::create(&out_path)
        .map_err(|e| ToolError::Io(format!("failed to create {}: {e}", out_path.display())))?;
    let stderr_file = File::create(&err_path)
        .map_err(|e| ToolError::Io(format!("failed to create {}: {e}", err_path.display())))?;

    debug!(command = %command_line, "running tool");
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file))
        .spawn()
        .map_err(|e| ToolError::Spawn { program, message: e.to_string() })?;

    let status = match timeout {
        None => child
            .wait()
            .map_err(|e| ToolError::Io(format!("failed to wait for {command_line}: {e}")))?,
        Some(limit) => wait_with_timeout(&mut child, limit, &command_line)?,
    };

    if !status.success() {
        return Err(ToolError::Failed { command: command_line, status: status.to_string() });
    }
    fs::read_to_string(&out_path)
        .map_err(|e| ToolError::Io(format!("failed to read {}: {e}", out_path.display())))
}

fn wait_with_timeout(
    child: &mut Child,
    limit: Duration,
    command_line: &str,
) -> Result<ExitStatus, ToolError> {
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if started.elapsed() >= limit {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ToolError::TimedOut {
                        command: command_line.to_string(),
                        secs: limit.as_secs(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(ToolError::Io(format!("failed to wait for {command_line}: {e}"))),
        }
    }
}

/// Render a command line for logs and error messages.
pub fn format_command(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|s| s.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eqbench_core::config::{BuildOptions, CompareOptions};
use eqbench_core::services::details::load_function_sets;
use eqbench_core::services::summary::parse_stat_summary;
use eqbench_core::services::tool::{BuildRequest, CompareRequest, EquivalenceTool, ToolError};
use eqbench_core::services::DiffKempTool;
use tempfile::tempdir;

const FAKE_DIFFKEMP: &str = r#"#!/bin/sh
case "$1" in
  --version)
    echo "diffkemp 0.6.1"
    ;;
  build)
    out="$3"
    mkdir -p "$out"
    printf -- '- list:\n  - name: main\n  - name: helper\n' > "$out/snapshot.yaml"
    echo "built $2"
    ;;
  compare)
    out="$5"
    mkdir -p "$out"
    printf 'results:\n  - function: helper\n' > "$out/diffkemp-out.yaml"
    echo "Total symbols: 2"
    echo "Equal:         1 (50%)"
    echo "Not equal:     1 (50%)"
    ;;
  *)
    echo "unknown command $1" >&2
    exit 2
    ;;
esac
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn tool(path: PathBuf, timeout: Option<Duration>) -> DiffKempTool {
    DiffKempTool { path, opt_path: "opt".into(), timeout }
}

fn build_request(root: &Path, source: &Path, name: &str) -> BuildRequest {
    BuildRequest {
        source: source.to_path_buf(),
        output_dir: root.join(name),
        options: BuildOptions::default(),
        log_prefix: root.join(format!("build-{name}")),
    }
}

#[test]
fn build_and_compare_through_external_script() {
    let temp = tempdir().unwrap();
    let script = write_script(temp.path(), "diffkemp", FAKE_DIFFKEMP);
    let source = temp.path().join("oldV.c");
    fs::write(&source, "int main(void) { return 0; }\n").unwrap();
    let tool = tool(script, Some(Duration::from_secs(30)));

    let old = build_request(temp.path(), &source, "old");
    let new = build_request(temp.path(), &source, "new");
    tool.build(&old).unwrap();
    tool.build(&new).unwrap();
    let build_log = fs::read_to_string(temp.path().join("build-old.out")).unwrap();
    assert!(build_log.contains("built"));

    let compare = CompareRequest {
        old_snapshot: old.output_dir.clone(),
        new_snapshot: new.output_dir.clone(),
        output_dir: temp.path().join("result"),
        options: CompareOptions::default(),
        function: None,
        log_prefix: temp.path().join("compare"),
    };
    let output = tool.compare(&compare).unwrap();
    let counts = parse_stat_summary(&output.stdout).unwrap();
    assert!(counts.is_mixed());

    let sets = load_function_sets(&old.output_dir, &compare.output_dir).unwrap();
    assert_eq!(sets.neq.iter().collect::<Vec<_>>(), vec!["helper"]);
    assert_eq!(sets.all.len(), 2);

    assert_eq!(tool.version().as_deref(), Some("diffkemp 0.6.1"));
}

#[test]
fn missing_source_is_rejected_before_spawning() {
    let temp = tempdir().unwrap();
    let tool = tool(temp.path().join("does-not-exist"), None);
    let request = build_request(temp.path(), &temp.path().join("absent.c"), "old");
    let err = tool.build(&request).unwrap_err();
    assert!(matches!(err, ToolError::MissingSource(_)), "unexpected error: {err}");
}

#[test]
fn non_zero_exit_is_reported_with_stderr_captured() {
    let temp = tempdir().unwrap();
    let script = write_script(
        temp.path(),
        "diffkemp",
        "#!/bin/sh\necho \"clang: error: no input\" >&2\nexit 3\n",
    );
    let source = temp.path().join("oldV.c");
    fs::write(&source, "").unwrap();
    let tool = tool(script, None);

    let err = tool.build(&build_request(temp.path(), &source, "old")).unwrap_err();
    assert!(matches!(err, ToolError::Failed { .. }), "unexpected error: {err}");
    assert!(!err.is_timeout());
    let stderr = fs::read_to_string(temp.path().join("build-old.err")).unwrap();
    assert!(stderr.contains("clang: error"));
}

#[test]
fn hung_invocation_is_killed_after_timeout() {
    let temp = tempdir().unwrap();
    let script = write_script(temp.path(), "diffkemp", "#!/bin/sh\nexec sleep 30\n");
    let source = temp.path().join("oldV.c");
    fs::write(&source, "").unwrap();
    let tool = tool(script, Some(Duration::from_secs(1)));

    let started = std::time::Instant::now();
    let err = tool.build(&build_request(temp.path(), &source, "old")).unwrap_err();
    assert!(err.is_timeout(), "unexpected error: {err}");
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[test]
fn spawn_failure_names_the_program() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("oldV.c");
    fs::write(&source, "").unwrap();
    let tool = tool(temp.path().join("no-such-diffkemp"), None);

    let err = tool.build(&build_request(temp.path(), &source, "old")).unwrap_err();
    match err {
        ToolError::Spawn { program, .. } => assert!(program.ends_with("no-such-diffkemp")),
        other => panic!("unexpected error: {other}"),
    }
}

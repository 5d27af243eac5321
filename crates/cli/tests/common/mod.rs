#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Stand-in for the checker: every case compares equal unless its output
/// directory sits under a `Neq` case, which yields a single differing function.
pub const FAKE_DIFFKEMP: &str = r#"#!/bin/sh
cmd="$1"
shift
case "$cmd" in
  --version)
    echo "diffkemp 0.6.1"
    ;;
  build)
    out=""
    for a in "$@"; do
      case "$a" in
        --*) ;;
        *) out="$a" ;;
      esac
    done
    mkdir -p "$out"
    printf -- '- list:\n  - name: main\n' > "$out/snapshot.yaml"
    ;;
  compare)
    out=""
    prev=""
    for a in "$@"; do
      if [ "$prev" = "-o" ]; then out="$a"; fi
      prev="$a"
    done
    mkdir -p "$out"
    case "$out" in
      */Neq/*)
        printf 'results:\n  - function: main\n' > "$out/diffkemp-out.yaml"
        printf 'Total symbols: 1\nEqual: 0\nNot equal: 1\n'
        ;;
      *)
        printf 'results: []\n' > "$out/diffkemp-out.yaml"
        printf 'Total symbols: 1\nEqual: 1\nNot equal: 0\n'
        ;;
    esac
    ;;
  *)
    echo "unknown command $cmd" >&2
    exit 2
    ;;
esac
"#;

#[cfg(unix)]
pub fn install_fake_tool(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("diffkemp");
    fs::write(&path, FAKE_DIFFKEMP).expect("write fake tool");
    let mut perms = fs::metadata(&path).expect("stat fake tool").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod fake tool");
    path
}

pub fn write_case(root: &Path, rel: &str, descriptor: Option<&str>) {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).expect("create case dir");
    fs::write(dir.join("oldV.c"), "int main(void) { return 0; }\n").expect("write old");
    fs::write(dir.join("newV.c"), "int main(void) { return 0; }\n").expect("write new");
    if let Some(body) = descriptor {
        fs::write(dir.join("info.json"), body).expect("write descriptor");
    }
}

/// Two-case corpus: one function-level `Eq` case and one aggregated `Neq` case.
pub fn small_corpus(root: &Path) {
    write_case(
        root,
        "EqBench/sum/Eq",
        Some(
            r#"{"function name": "sum", "program name": "sum",
                "changes": [{"change type": "loop", "change operation": "unroll"}]}"#,
        ),
    );
    write_case(root, "EqBench/prog/Neq", None);
}

pub const RESULTS_HEADER: &str = "type;benchmark;program;expected;result;correct;changes";

pub fn write_results(path: &Path, rows: &[&str]) {
    let mut body = String::from(RESULTS_HEADER);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    fs::write(path, body).expect("write results");
}

mod common;

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

use common::{small_corpus, write_results};

#[test]
fn help_lists_subcommands() {
    cargo_bin_cmd!("eqbench-runner")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("sweep"))
        .stdout(predicate::str::contains("list-cases"));
}

#[test]
fn init_config_writes_yaml_in_cwd() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("eqbench-runner")
        .current_dir(dir.path())
        .arg("init-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote run config"));

    let body = fs::read_to_string(dir.path().join("eqbench.yaml")).expect("config written");
    assert!(body.contains("default-no-patterns"));

    cargo_bin_cmd!("eqbench-runner")
        .current_dir(dir.path())
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn list_cases_prints_keys() {
    let dir = tempdir().expect("tempdir");
    small_corpus(dir.path());

    cargo_bin_cmd!("eqbench-runner")
        .arg("list-cases")
        .arg("--benchmarks")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cases (2):"))
        .stdout(predicate::str::contains("EqBench/sum/Eq [function-level, Eq] function=sum"));
}

#[test]
fn summary_prints_markdown_table() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("results.csv");
    write_results(&path, &["aggregated;B;p;Eq;Eq;True;"]);

    cargo_bin_cmd!("eqbench-runner")
        .arg("summary")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("| aggregated | 1 | 0 | 0 | 0 | 0 | 1 |"));
}

#[test]
fn diff_of_identical_tables_reports_nothing() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("results.csv");
    write_results(&path, &["aggregated;B;p;Eq;Eq;True;"]);

    cargo_bin_cmd!("eqbench-runner")
        .arg("diff")
        .arg(&path)
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences."));
}

#[test]
fn run_with_missing_corpus_fails() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("eqbench-runner")
        .arg("run")
        .arg("--benchmarks")
        .arg(dir.path().join("missing"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Benchmark directory does not exist"));
}

#[test]
fn sweep_rejects_unknown_configuration() {
    let dir = tempdir().expect("tempdir");
    small_corpus(dir.path());
    cargo_bin_cmd!("eqbench-runner")
        .arg("sweep")
        .arg("--benchmarks")
        .arg(dir.path())
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--only")
        .arg("O3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sweep configuration"));
}

#[test]
fn run_refuses_to_force_over_the_corpus() {
    let dir = tempdir().expect("tempdir");
    small_corpus(dir.path());

    cargo_bin_cmd!("eqbench-runner")
        .arg("run")
        .arg("--benchmarks")
        .arg(dir.path())
        .arg("--output")
        .arg(dir.path())
        .arg("--force")
        .assert()
        .failure()
        .stderr(predicate::str::contains("contains the benchmark corpus"));

    assert!(dir.path().join("EqBench/sum/Eq/oldV.c").is_file());
}

#[cfg(unix)]
#[test]
fn run_end_to_end_with_fake_tool() {
    let dir = tempdir().expect("tempdir");
    let corpus = dir.path().join("corpus");
    small_corpus(&corpus);
    let tool = common::install_fake_tool(dir.path());
    let out = dir.path().join("out");

    cargo_bin_cmd!("eqbench-runner")
        .arg("run")
        .arg("--benchmarks")
        .arg(&corpus)
        .arg("--output")
        .arg(&out)
        .arg("--tool")
        .arg(&tool)
        .arg("--add-src-paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cases: 2 (failed: 0)"));

    let results = fs::read_to_string(out.join("results.csv")).expect("results");
    let mut lines = results.lines();
    assert_eq!(
        lines.next(),
        Some("type;benchmark;program;expected;result;correct;changes;old_src;new_src")
    );
    assert!(results.contains("aggregated;EqBench;prog;Neq;Neq;True;"));
    assert!(results.contains("function-level;EqBench;sum;Eq;Eq;True;loop: unroll;"));
    assert!(out.join("summary.md").is_file());
    assert!(out.join("run.json").is_file());

    // A second run into the same directory needs --force.
    cargo_bin_cmd!("eqbench-runner")
        .arg("run")
        .arg("--benchmarks")
        .arg(&corpus)
        .arg("--output")
        .arg(&out)
        .arg("--tool")
        .arg(&tool)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[cfg(unix)]
#[test]
fn sweep_writes_one_directory_per_configuration() {
    let dir = tempdir().expect("tempdir");
    let corpus = dir.path().join("corpus");
    small_corpus(&corpus);
    let tool = common::install_fake_tool(dir.path());
    let out = dir.path().join("sweep");

    cargo_bin_cmd!("eqbench-runner")
        .arg("sweep")
        .arg("--benchmarks")
        .arg(&corpus)
        .arg("--output")
        .arg(&out)
        .arg("--tool")
        .arg(&tool)
        .arg("--only")
        .arg("default")
        .arg("--only")
        .arg("O2")
        .arg("--jobs")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("| O2 |"));

    assert!(out.join("default/results.csv").is_file());
    assert!(out.join("O2/summary.md").is_file());
    assert!(!out.join("passes").exists());
    let sweep = fs::read_to_string(out.join("sweep.md")).expect("sweep summary");
    assert!(sweep.contains("| default | 2 | 0 | 0 | 2 |"));
}

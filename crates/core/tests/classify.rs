use std::collections::BTreeSet;

use eqbench_core::config::IgnoreRules;
use eqbench_core::model::{
    BenchmarkType, ComparisonOutcome, FunctionSets, Label, SymbolCounts, Verdict,
};
use eqbench_core::services::classify::{classify, ClassifyError};

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn mixed(all: &[&str], neq: &[&str]) -> ComparisonOutcome {
    ComparisonOutcome {
        counts: SymbolCounts {
            total: all.len() as u64,
            equal: (all.len() - neq.len()) as u64,
            not_equal: neq.len() as u64,
        },
        functions: Some(FunctionSets { neq: set(neq), all: set(all) }),
    }
}

fn counts(total: u64, equal: u64, not_equal: u64) -> ComparisonOutcome {
    ComparisonOutcome { counts: SymbolCounts { total, equal, not_equal }, functions: None }
}

#[test]
fn all_equal_counts_yield_eq() {
    let c = classify(&counts(5, 5, 0), Label::Eq, "b/p/Eq", BenchmarkType::FunctionLevel, &IgnoreRules::new())
        .unwrap();
    assert_eq!(c.verdict, Verdict::Eq);
    assert!(c.correct);
}

#[test]
fn all_not_equal_counts_yield_neq() {
    let c = classify(&counts(3, 0, 3), Label::Eq, "b/p/Eq", BenchmarkType::Aggregated, &IgnoreRules::new())
        .unwrap();
    assert_eq!(c.verdict, Verdict::Neq);
    assert!(!c.correct);
}

#[test]
fn zero_symbols_count_as_eq() {
    let c = classify(&counts(0, 0, 0), Label::Eq, "k", BenchmarkType::Aggregated, &IgnoreRules::new())
        .unwrap();
    assert_eq!(c.verdict, Verdict::Eq);
}

#[test]
fn mixed_without_ignores_reports_both_partitions() {
    let outcome = mixed(&["a", "b", "c", "d"], &["c", "d"]);
    let c = classify(&outcome, Label::Neq, "b/p/Neq", BenchmarkType::Aggregated, &IgnoreRules::new())
        .unwrap();
    assert_eq!(c.verdict.to_string(), "2 Eq [a,b], 2 Neq [c,d]");
    assert!(!c.correct, "mixed verdicts never match a binary label");
}

#[test]
fn ignoring_not_equal_functions_yields_eq() {
    let outcome = mixed(&["a", "b", "c", "d"], &["c", "d"]);
    let mut ignore = IgnoreRules::new();
    ignore.insert("b/p/Neq", ["c", "d"]);
    let c = classify(&outcome, Label::Neq, "b/p/Neq", BenchmarkType::Aggregated, &ignore).unwrap();
    assert_eq!(c.verdict, Verdict::Eq);
    assert!(!c.correct);
}

#[test]
fn ignoring_equal_functions_yields_neq() {
    let outcome = mixed(&["a", "b", "c"], &["c"]);
    let mut ignore = IgnoreRules::new();
    ignore.insert("k", ["a", "b"]);
    let c = classify(&outcome, Label::Neq, "k", BenchmarkType::Aggregated, &ignore).unwrap();
    assert_eq!(c.verdict, Verdict::Neq);
    assert!(c.correct);
}

#[test]
fn ignore_rules_for_other_keys_do_not_apply() {
    let outcome = mixed(&["a", "b"], &["b"]);
    let mut ignore = IgnoreRules::new();
    ignore.insert("other/key/Eq", ["b"]);
    let c = classify(&outcome, Label::Eq, "k", BenchmarkType::Aggregated, &ignore).unwrap();
    assert!(matches!(c.verdict, Verdict::Mixed { .. }));
}

#[test]
fn ignore_filtering_is_order_independent() {
    let outcome = mixed(&["f1", "f2", "f3", "f4", "f5"], &["f2", "f4"]);
    let mut forward = IgnoreRules::new();
    forward.insert("k", ["f2", "f5"]);
    let mut backward = IgnoreRules::new();
    backward.insert("k", ["f5"]).insert("k", ["f2", "f2"]);

    let a = classify(&outcome, Label::Neq, "k", BenchmarkType::Aggregated, &forward).unwrap();
    let b = classify(&outcome, Label::Neq, "k", BenchmarkType::Aggregated, &backward).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.verdict.to_string(), "2 Eq [f1,f3], 1 Neq [f4]");
}

#[test]
fn neq_outside_the_listing_still_counts() {
    // A not-equal function missing from the snapshot listing keeps the verdict mixed.
    let outcome = ComparisonOutcome {
        counts: SymbolCounts { total: 2, equal: 1, not_equal: 1 },
        functions: Some(FunctionSets { neq: set(&["ghost"]), all: set(&["a"]) }),
    };
    let c = classify(&outcome, Label::Eq, "k", BenchmarkType::Aggregated, &IgnoreRules::new()).unwrap();
    assert_eq!(c.verdict.to_string(), "1 Eq [a], 1 Neq [ghost]");
}

#[test]
fn mixed_counts_without_details_is_an_error() {
    let err = classify(&counts(4, 2, 2), Label::Eq, "k", BenchmarkType::Aggregated, &IgnoreRules::new())
        .unwrap_err();
    assert!(matches!(err, ClassifyError::MissingFunctionDetails));
}

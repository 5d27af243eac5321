//! eqbench-core
//!
//! Core library for running an external equivalence checker over a corpus of
//! paired C program versions and judging its answers.
//!
//! This crate defines the data model, corpus discovery, the tool adapter,
//! result classification, and reporting. The goal is to keep all substantive
//! logic here so it is fully testable and reusable from the CLI.

pub mod config;
pub mod corpus;
pub mod model;
pub mod report;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

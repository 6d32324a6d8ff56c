//! Yapee QA CLI
//!
//! Command-line front end that checks the storefront, prepares the
//! environment, runs suites and summarizes the results.

pub mod commands;
pub mod output;
pub mod prompt;

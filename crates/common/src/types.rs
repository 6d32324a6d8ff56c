//! Core result and snapshot types

use serde::{Deserialize, Serialize};

use crate::config::RunConfiguration;

/// `rustc --version` of the compiler that built this crate
pub const RUSTC_VERSION: &str = env!("YAPEE_QA_RUSTC_VERSION");

/// Outcome of one suite invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub suite_name: String,
    pub success: bool,
    /// Process exit code; `-1` when the process was terminated by a signal
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn from_exit(suite_name: impl Into<String>, exit_code: Option<i32>, duration_ms: u64) -> Self {
        let exit_code = exit_code.unwrap_or(-1);
        Self {
            suite_name: suite_name.into(),
            success: exit_code == 0,
            exit_code,
            duration_ms,
        }
    }
}

/// Pass/fail counts over a list of execution results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl RunTotals {
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Coarse description of the machine and configuration a run happened on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    /// Compiler that built the runner, e.g. `rustc 1.79.0 (129f3b996 2024-06-10)`
    pub runtime_version: String,
    /// Version of the runner itself
    pub tool_version: String,
    pub platform: String,
    pub arch: String,
    pub hostname: Option<String>,
    pub environment: String,
    pub timestamp: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub workers: u32,
}

impl EnvironmentSnapshot {
    pub fn capture(config: &RunConfiguration) -> Self {
        Self {
            runtime_version: RUSTC_VERSION.to_string(),
            tool_version: crate::VERSION.to_string(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            hostname: hostname::get().ok().map(|h| h.to_string_lossy().into_owned()),
            environment: config.mode.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            base_url: config.base_url.clone(),
            timeout_ms: config.timeout_ms,
            retries: config.retries,
            workers: config.workers,
        }
    }
}

//! Suite runner: executes registry suites as child processes and records results

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{error, info, warn};

use yapee_qa_common::{
    EnvironmentSnapshot, ExecutionResult, Invocation, RunConfiguration, RunTotals, SuiteDescriptor,
    SuiteRegistry,
};

use crate::error::{E2eError, E2eResult};
use crate::layout::ArtifactLayout;

/// Contents of `test-results/run-report.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub timestamp: String,
    pub duration_ms: u64,
    pub config: RunConfiguration,
    pub results: Vec<ExecutionResult>,
    pub totals: RunTotals,
    pub environment: EnvironmentSnapshot,
}

/// Runs suites one at a time from the artifact root
pub struct SuiteRunner {
    registry: SuiteRegistry,
    config: Arc<RunConfiguration>,
    layout: ArtifactLayout,
    results: Vec<ExecutionResult>,
    started: Instant,
}

impl SuiteRunner {
    pub fn new(registry: SuiteRegistry, config: Arc<RunConfiguration>, layout: ArtifactLayout) -> Self {
        Self {
            registry,
            config,
            layout,
            results: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn registry(&self) -> &SuiteRegistry {
        &self.registry
    }

    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Run one suite; composites run their members in order.
    ///
    /// Returns `Ok(false)` when the suite ran and failed or its required file
    /// is missing. Errors are reserved for suites that could not be started.
    pub async fn run_suite(&mut self, suite: &SuiteDescriptor) -> E2eResult<bool> {
        info!("Running: {}", suite.display_name);
        info!("Description: {}", suite.description);

        let root = self.layout.root().to_path_buf();
        if let Err(e) = self.registry.check_dependency(suite, &root) {
            error!("{}", e);
            return Ok(false);
        }

        if let Invocation::Composite(_) = suite.invocation {
            return self.run_composite(suite).await;
        }

        Ok(self.execute(suite).await?.success)
    }

    async fn run_composite(&mut self, suite: &SuiteDescriptor) -> E2eResult<bool> {
        info!("Running All Test Suites...");
        let root = self.layout.root().to_path_buf();

        let (runnable, skipped): (Vec<SuiteDescriptor>, Vec<String>) = {
            let expansion = self.registry.expand(suite, &root);
            (
                expansion.runnable.into_iter().cloned().collect(),
                expansion
                    .skipped
                    .into_iter()
                    .map(|s| s.display_name.clone())
                    .collect(),
            )
        };
        for name in &skipped {
            warn!("Skipping {} - file not found", name);
        }

        let mut ran = Vec::with_capacity(runnable.len());
        for member in &runnable {
            ran.push(self.execute(member).await?);
        }

        info!("All Tests Summary:");
        for result in &ran {
            let status = if result.success { "✅" } else { "❌" };
            info!("{} {} ({}ms)", status, result.suite_name, result.duration_ms);
        }
        let totals = RunTotals::from_results(&ran);
        info!("Overall: {}/{} test suites passed", totals.passed, totals.total);

        Ok(totals.all_passed())
    }

    /// Spawn the suite's command through the platform shell and wait for it
    pub async fn execute(&mut self, suite: &SuiteDescriptor) -> E2eResult<ExecutionResult> {
        let command_line = match &suite.invocation {
            Invocation::Command(cmd) => cmd.clone(),
            Invocation::Composite(_) => {
                return Err(E2eError::Spawn {
                    suite: suite.key.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "composite suites have no command",
                    ),
                })
            }
        };

        info!("Running {}...", suite.display_name);
        info!("Command: {}", command_line);

        let mut command = shell_command(&command_line);
        command
            .current_dir(self.layout.root())
            .envs(self.config.child_env())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let start = Instant::now();
        let status = command
            .status()
            .await
            .map_err(|source| E2eError::Spawn {
                suite: suite.key.clone(),
                source,
            })?;
        let duration_ms = start.elapsed().as_millis() as u64;

        let result = ExecutionResult::from_exit(&suite.display_name, status.code(), duration_ms);
        if result.success {
            info!("{} completed successfully! ({}ms)", suite.display_name, duration_ms);
        } else {
            error!(
                "{} failed with code {} ({}ms)",
                suite.display_name, result.exit_code, duration_ms
            );
        }

        self.results.push(result.clone());
        Ok(result)
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            duration_ms: self.elapsed_ms(),
            config: (*self.config).clone(),
            results: self.results.clone(),
            totals: RunTotals::from_results(&self.results),
            environment: EnvironmentSnapshot::capture(&self.config),
        }
    }

    /// Write `test-results/run-report.json`
    pub fn write_report(&self) -> E2eResult<PathBuf> {
        info!("Generating final report...");
        std::fs::create_dir_all(self.layout.results())?;

        let path = self.layout.run_report_file();
        let json = serde_json::to_string_pretty(&self.report())?;
        std::fs::write(&path, json)?;

        info!("Report generated: {}", path.display());
        Ok(path)
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(command_line);
    command
}

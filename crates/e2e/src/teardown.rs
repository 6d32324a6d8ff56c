//! Post-run reporting, archiving and retention

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use yapee_qa_common::RunConfiguration;

use crate::error::{E2eError, E2eResult};
use crate::layout::ArtifactLayout;
use crate::summary::{ArtifactCounts, PerformanceReport, ResultsFile, TestSummaryReport};

/// Archived runs kept under `test-results/runs/`
pub const MAX_ARCHIVED_RUNS: usize = 10;

const TEMP_EXTENSIONS: &[&str] = &["tmp", "temp"];
const JUNK_FILES: &[&str] = &[".DS_Store"];

/// Outcome of a single teardown step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub step: &'static str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// What a teardown pass did; steps fail independently
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeardownReport {
    pub steps: Vec<StepOutcome>,
    pub summary: Option<TestSummaryReport>,
    pub archive_dir: Option<PathBuf>,
    pub cleaned_files: usize,
    pub evicted_runs: Vec<PathBuf>,
}

impl TeardownReport {
    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.success)
    }

    fn record<T>(&mut self, step: &'static str, result: &E2eResult<T>) {
        let outcome = match result {
            Ok(_) => StepOutcome {
                step,
                success: true,
                detail: None,
            },
            Err(e) => {
                error!("Teardown step '{}' failed: {}", step, e);
                StepOutcome {
                    step,
                    success: false,
                    detail: Some(e.to_string()),
                }
            }
        };
        self.steps.push(outcome);
    }
}

/// Summarizes, archives and prunes artifacts after a run
pub struct Teardown {
    config: RunConfiguration,
    layout: ArtifactLayout,
    max_runs: usize,
}

impl Teardown {
    pub fn new(config: RunConfiguration, layout: ArtifactLayout) -> Self {
        Self {
            config,
            layout,
            max_runs: MAX_ARCHIVED_RUNS,
        }
    }

    pub fn with_max_runs(mut self, max_runs: usize) -> Self {
        self.max_runs = max_runs;
        self
    }

    /// Write `test-summary.json` and `test-summary.md`
    pub fn generate_summary(&self) -> E2eResult<TestSummaryReport> {
        info!("Generating test summary report...");
        let results = ResultsFile::load(&self.layout.results_file())?;
        let summary = TestSummaryReport::build(
            &results,
            ArtifactCounts::collect(&self.layout),
            self.config.mode.as_str(),
        );

        std::fs::create_dir_all(self.layout.results())?;
        std::fs::write(
            self.layout.summary_json_file(),
            serde_json::to_string_pretty(&summary)?,
        )?;
        info!("Created: {}", self.layout.summary_json_file().display());

        std::fs::write(self.layout.summary_markdown_file(), summary.to_markdown())?;
        info!("Created: {}", self.layout.summary_markdown_file().display());

        Ok(summary)
    }

    /// Copy this run's media and HTML report into a fresh run directory
    pub fn archive_run(&self) -> E2eResult<PathBuf> {
        info!("Organizing test artifacts...");
        let run_dir = unique_run_dir(&self.layout.runs(), &run_dir_name(chrono::Utc::now()));
        std::fs::create_dir_all(&run_dir)?;

        for (name, dir) in self.layout.media_directories() {
            if !dir.is_dir() || std::fs::read_dir(&dir)?.next().is_none() {
                continue;
            }
            let copied = copy_tree(&dir, &run_dir.join(name))?;
            info!("Archived {} files from {}/", copied, name);
        }

        let reports = self.layout.reports();
        if reports.is_dir() {
            copy_tree(&reports, &run_dir.join("report"))?;
            info!("Archived HTML report");
        }

        info!("Artifacts organized in: {}", run_dir.display());
        Ok(run_dir)
    }

    /// Remove temp files and OS junk; keep empty media directories with `.gitkeep`
    pub fn cleanup_temporary_files(&self) -> E2eResult<usize> {
        info!("Cleaning up temporary files...");
        let mut cleaned = 0;

        let results = self.layout.results();
        if results.is_dir() {
            for entry in std::fs::read_dir(&results)? {
                let path = entry?.path();
                let is_temp = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| TEMP_EXTENSIONS.contains(&e))
                    .unwrap_or(false);
                if path.is_file() && is_temp {
                    std::fs::remove_file(&path)?;
                    cleaned += 1;
                }
            }
        }

        for (_, dir) in self.layout.media_directories() {
            if !dir.is_dir() {
                continue;
            }
            for junk in JUNK_FILES {
                let path = dir.join(junk);
                if path.is_file() {
                    std::fs::remove_file(&path)?;
                    cleaned += 1;
                }
            }
            if std::fs::read_dir(&dir)?.next().is_none() {
                std::fs::write(dir.join(".gitkeep"), "")?;
            }
        }

        if cleaned > 0 {
            info!("Cleaned {} temporary files", cleaned);
        } else {
            info!("No temporary files to clean");
        }
        Ok(cleaned)
    }

    /// Write `performance-report.json`
    pub fn generate_performance_report(&self) -> E2eResult<PerformanceReport> {
        info!("Generating performance report...");
        let results = ResultsFile::load(&self.layout.results_file())?;
        let report = PerformanceReport::from_records(results.records());

        std::fs::create_dir_all(self.layout.results())?;
        std::fs::write(
            self.layout.performance_report_file(),
            serde_json::to_string_pretty(&report)?,
        )?;
        info!("Created: {}", self.layout.performance_report_file().display());
        Ok(report)
    }

    /// Run every step; a failing step does not stop the ones after it
    pub fn run(&self) -> TeardownReport {
        info!("Starting Yapee Test Automation Teardown...");
        let mut report = TeardownReport::default();

        let summary = self.generate_summary();
        report.record("summary", &summary);
        report.summary = summary.ok();

        let archive = self.archive_run();
        report.record("archive", &archive);
        report.archive_dir = archive.ok();

        let cleaned = self.cleanup_temporary_files();
        report.record("cleanup", &cleaned);
        report.cleaned_files = cleaned.unwrap_or(0);

        let performance = self.generate_performance_report();
        report.record("performance", &performance);

        info!("Archiving old test runs...");
        let evicted = enforce_retention(&self.layout.runs(), self.max_runs);
        report.record("retention", &evicted);
        report.evicted_runs = evicted.unwrap_or_default();

        if report.all_succeeded() {
            info!("Test teardown completed successfully");
        } else {
            warn!("Test teardown completed with errors");
        }
        report
    }
}

/// `run-<timestamp>` with `:` and `.` replaced so the name is path-safe
pub fn run_dir_name(at: chrono::DateTime<chrono::Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("run-{}", stamp)
}

fn unique_run_dir(runs_dir: &Path, name: &str) -> PathBuf {
    let candidate = runs_dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    (1..)
        .map(|n| runs_dir.join(format!("{}-{}", name, n)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Recursively copy `src` into `dest`; returns the number of files copied
fn copy_tree(src: &Path, dest: &Path) -> E2eResult<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| E2eError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Delete the oldest run directories until at most `cap` remain
pub fn enforce_retention(runs_dir: &Path, cap: usize) -> E2eResult<Vec<PathBuf>> {
    if !runs_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut runs: Vec<(SystemTime, String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(runs_dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_dir() {
            continue;
        }
        let created = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        runs.push((created, entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }

    if runs.len() <= cap {
        info!("No old test runs to archive");
        return Ok(Vec::new());
    }

    runs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let excess = runs.len() - cap;

    let mut removed = Vec::with_capacity(excess);
    for (_, _, path) in runs.into_iter().take(excess) {
        std::fs::remove_dir_all(&path)?;
        removed.push(path);
    }
    info!("Removed {} old test runs", removed.len());
    Ok(removed)
}

//! On-disk layout of test artifacts

use std::path::{Path, PathBuf};

/// Rooted paths of every directory and file the orchestration reads or writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn screenshots(&self) -> PathBuf {
        self.root.join("screenshots")
    }

    pub fn videos(&self) -> PathBuf {
        self.root.join("videos")
    }

    pub fn results(&self) -> PathBuf {
        self.root.join("test-results")
    }

    pub fn reports(&self) -> PathBuf {
        self.root.join("playwright-report")
    }

    pub fn traces(&self) -> PathBuf {
        self.root.join("traces")
    }

    pub fn downloads(&self) -> PathBuf {
        self.root.join("downloads")
    }

    /// Parent of the per-run archive directories
    pub fn runs(&self) -> PathBuf {
        self.results().join("runs")
    }

    /// The six directories setup creates
    pub fn directories(&self) -> Vec<PathBuf> {
        vec![
            self.screenshots(),
            self.videos(),
            self.results(),
            self.reports(),
            self.traces(),
            self.downloads(),
        ]
    }

    /// Directories whose contents are archived per run
    pub fn media_directories(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("screenshots", self.screenshots()),
            ("videos", self.videos()),
            ("traces", self.traces()),
        ]
    }

    /// Playwright JSON reporter output
    pub fn results_file(&self) -> PathBuf {
        self.results().join("results.json")
    }

    pub fn run_report_file(&self) -> PathBuf {
        self.results().join("run-report.json")
    }

    pub fn summary_json_file(&self) -> PathBuf {
        self.results().join("test-summary.json")
    }

    pub fn summary_markdown_file(&self) -> PathBuf {
        self.results().join("test-summary.md")
    }

    pub fn performance_report_file(&self) -> PathBuf {
        self.results().join("performance-report.json")
    }

    pub fn environment_file(&self) -> PathBuf {
        self.results().join("environment.json")
    }

    pub fn report_template_file(&self) -> PathBuf {
        self.results().join("report-template.json")
    }

    pub fn test_data_file(&self) -> PathBuf {
        self.root.join("test-data.json")
    }

    pub fn test_config_file(&self) -> PathBuf {
        self.root.join("test-config.json")
    }

    pub fn artifacts_readme_file(&self) -> PathBuf {
        self.root.join("README-test-artifacts.md")
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::new(".")
    }
}

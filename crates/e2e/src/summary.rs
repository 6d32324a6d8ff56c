//! Test result summaries built from the Playwright JSON reporter output

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::E2eResult;
use crate::layout::ArtifactLayout;

/// `stats` block of `results.json`.
///
/// Playwright itself writes `expected`/`unexpected`; hand-written result files
/// use `passed`/`failed`. Both are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultStats {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, alias = "expected")]
    pub passed: u64,
    #[serde(default, alias = "unexpected")]
    pub failed: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub flaky: u64,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl ResultStats {
    pub fn total(&self) -> u64 {
        self.total
            .unwrap_or(self.passed + self.failed + self.skipped + self.flaky)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultError {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestAttempt {
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<ResultError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultTest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub results: Vec<TestAttempt>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tests: Vec<ResultTest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSuite {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub specs: Vec<ResultSpec>,
    #[serde(default)]
    pub suites: Vec<ResultSuite>,
}

/// Parsed `test-results/results.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsFile {
    #[serde(default)]
    pub stats: ResultStats,
    #[serde(default)]
    pub suites: Vec<ResultSuite>,
}

/// One executed attempt flattened out of the suite tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRecord {
    pub test: String,
    pub duration: f64,
    pub status: String,
    #[serde(skip)]
    pub error: Option<String>,
}

impl ResultsFile {
    /// Load the results file; a missing file yields an empty result set
    pub fn load(path: &Path) -> E2eResult<Self> {
        if !path.exists() {
            debug!("No results file at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Every attempt in the suite tree, nested suites included
    pub fn records(&self) -> Vec<TestRecord> {
        fn walk(suite: &ResultSuite, out: &mut Vec<TestRecord>) {
            for spec in &suite.specs {
                for test in &spec.tests {
                    let title = test.title.clone().unwrap_or_else(|| spec.title.clone());
                    for attempt in &test.results {
                        out.push(TestRecord {
                            test: title.clone(),
                            duration: attempt.duration.unwrap_or(0.0),
                            status: attempt.status.clone().unwrap_or_default(),
                            error: attempt.error.as_ref().and_then(|e| e.message.clone()),
                        });
                    }
                }
            }
            for child in &suite.suites {
                walk(child, out);
            }
        }

        let mut out = Vec::new();
        for suite in &self.suites {
            walk(suite, &mut out);
        }
        out
    }

    /// Distinct non-empty suite titles at every nesting level
    pub fn features(&self) -> Vec<String> {
        fn walk(suite: &ResultSuite, out: &mut BTreeSet<String>) {
            if !suite.title.is_empty() {
                out.insert(suite.title.clone());
            }
            for child in &suite.suites {
                walk(child, out);
            }
        }

        let mut set = BTreeSet::new();
        for suite in &self.suites {
            walk(suite, &mut set);
        }
        set.into_iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInfo {
    pub id: String,
    pub timestamp: String,
    pub duration: u64,
    pub environment: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCounts {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub flaky: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCounts {
    pub screenshots: usize,
    pub videos: usize,
    pub traces: usize,
    pub reports: usize,
}

impl ArtifactCounts {
    pub fn collect(layout: &ArtifactLayout) -> Self {
        Self {
            screenshots: count_files(&layout.screenshots(), "png"),
            videos: count_files(&layout.videos(), "webm"),
            traces: count_files(&layout.traces(), "zip"),
            reports: count_files(&layout.reports(), "html"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestTiming {
    pub title: String,
    pub duration: f64,
}

impl TestTiming {
    fn none() -> Self {
        Self {
            title: "N/A".to_string(),
            duration: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub avg_test_duration: f64,
    pub slowest_test: TestTiming,
    pub fastest_test: TestTiming,
}

impl PerformanceSummary {
    /// Only attempts with a non-zero duration take part
    pub fn from_records(records: &[TestRecord]) -> Self {
        let timed: Vec<&TestRecord> = records.iter().filter(|r| r.duration > 0.0).collect();
        if timed.is_empty() {
            return Self {
                avg_test_duration: 0.0,
                slowest_test: TestTiming::none(),
                fastest_test: TestTiming::none(),
            };
        }

        let timing = |r: &TestRecord| TestTiming {
            title: r.test.clone(),
            duration: r.duration,
        };
        // First occurrence wins on ties.
        let mut slowest = timed[0];
        let mut fastest = timed[0];
        for record in &timed[1..] {
            if record.duration > slowest.duration {
                slowest = record;
            }
            if record.duration < fastest.duration {
                fastest = record;
            }
        }

        Self {
            avg_test_duration: timed.iter().map(|r| r.duration).sum::<f64>() / timed.len() as f64,
            slowest_test: timing(slowest),
            fastest_test: timing(fastest),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub pages_visited: Vec<String>,
    pub features_tested: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub test: String,
    pub error: String,
    pub duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub failures: Vec<Failure>,
    pub warnings: Vec<String>,
}

/// Contents of `test-results/test-summary.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummaryReport {
    pub test_run: RunInfo,
    pub results: ResultCounts,
    pub artifacts: ArtifactCounts,
    pub performance: PerformanceSummary,
    pub coverage: CoverageSummary,
    pub issues: IssueSummary,
}

impl TestSummaryReport {
    pub fn build(results: &ResultsFile, artifacts: ArtifactCounts, environment: &str) -> Self {
        let now = chrono::Utc::now();
        let records = results.records();

        let failures = records
            .iter()
            .filter(|r| r.status == "failed")
            .map(|r| Failure {
                test: r.test.clone(),
                error: r.error.clone().unwrap_or_else(|| "Unknown error".to_string()),
                duration: r.duration,
            })
            .collect();

        Self {
            test_run: RunInfo {
                id: format!("test-run-{}", now.timestamp_millis()),
                timestamp: now.to_rfc3339(),
                duration: results.stats.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
                environment: environment.to_string(),
            },
            results: ResultCounts {
                total: results.stats.total(),
                passed: results.stats.passed,
                failed: results.stats.failed,
                skipped: results.stats.skipped,
                flaky: results.stats.flaky,
            },
            artifacts,
            performance: PerformanceSummary::from_records(&records),
            coverage: CoverageSummary {
                pages_visited: Vec::new(),
                features_tested: results.features(),
            },
            issues: IssueSummary {
                failures,
                warnings: Vec::new(),
            },
        }
    }

    /// Human-readable rendering for `test-summary.md`
    pub fn to_markdown(&self) -> String {
        let r = &self.results;
        let a = &self.artifacts;
        let p = &self.performance;
        format!(
            "# Yapee Test Automation Summary\n\
             \n\
             ## Test Run Information\n\
             - **Run ID**: {id}\n\
             - **Timestamp**: {timestamp}\n\
             - **Environment**: {environment}\n\
             - **Duration**: {duration}s\n\
             \n\
             ## Test Results\n\
             - **Total Tests**: {total}\n\
             - **Passed**: {passed} ✅\n\
             - **Failed**: {failed} ❌\n\
             - **Skipped**: {skipped} ⏭️\n\
             - **Flaky**: {flaky} 🔄\n\
             \n\
             ## Artifacts Generated\n\
             - **Screenshots**: {screenshots}\n\
             - **Videos**: {videos}\n\
             - **Traces**: {traces}\n\
             - **Reports**: {reports}\n\
             \n\
             ## Performance Metrics\n\
             - **Average Test Duration**: {avg}ms\n\
             - **Slowest Test**: {slow_title} ({slow}ms)\n\
             - **Fastest Test**: {fast_title} ({fast}ms)\n\
             \n\
             ## Coverage\n\
             - **Pages Visited**: {pages}\n\
             - **Features Tested**: {features}\n\
             \n\
             ## Issues\n\
             - **Failures**: {failures}\n\
             - **Warnings**: {warnings}\n\
             \n\
             ---\n\
             *Generated by Yapee Test Automation Suite*\n",
            id = self.test_run.id,
            timestamp = self.test_run.timestamp,
            environment = self.test_run.environment,
            duration = (self.test_run.duration as f64 / 1000.0).round(),
            total = r.total,
            passed = r.passed,
            failed = r.failed,
            skipped = r.skipped,
            flaky = r.flaky,
            screenshots = a.screenshots,
            videos = a.videos,
            traces = a.traces,
            reports = a.reports,
            avg = p.avg_test_duration.round(),
            slow_title = p.slowest_test.title,
            slow = p.slowest_test.duration.round(),
            fast_title = p.fastest_test.title,
            fast = p.fastest_test.duration.round(),
            pages = self.coverage.pages_visited.len(),
            features = self.coverage.features_tested.len(),
            failures = self.issues.failures.len(),
            warnings = self.issues.warnings.len(),
        )
    }
}

/// Contents of `test-results/performance-report.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub timestamp: String,
    pub test_durations: Vec<TestRecord>,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub average_test_duration: f64,
    pub slowest_tests: Vec<TestRecord>,
    pub fastest_tests: Vec<TestRecord>,
    pub total_duration: f64,
}

impl PerformanceReport {
    pub fn from_records(records: Vec<TestRecord>) -> Self {
        let durations: Vec<TestRecord> = records.into_iter().filter(|r| r.duration > 0.0).collect();

        let mut by_duration = durations.clone();
        by_duration.sort_by(|a, b| b.duration.total_cmp(&a.duration));
        let slowest_tests = by_duration.iter().take(5).cloned().collect();
        by_duration.reverse();
        let fastest_tests = by_duration.iter().take(5).cloned().collect();

        let total_duration: f64 = durations.iter().map(|r| r.duration).sum();
        let average_test_duration = if durations.is_empty() {
            0.0
        } else {
            total_duration / durations.len() as f64
        };

        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            test_durations: durations,
            metrics: PerformanceMetrics {
                average_test_duration,
                slowest_tests,
                fastest_tests,
                total_duration,
            },
        }
    }
}

/// Files directly inside `dir` with the given extension; 0 when unreadable
pub fn count_files(dir: &Path, extension: &str) -> usize {
    if !dir.is_dir() {
        return 0;
    }
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some(extension))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PLAYWRIGHT_RESULTS: &str = r#"{
        "stats": { "startTime": "2026-10-18T10:00:00.000Z", "duration": 4200.5, "expected": 2, "unexpected": 1, "skipped": 1, "flaky": 0 },
        "suites": [{
            "title": "contact.spec.js",
            "specs": [],
            "suites": [{
                "title": "Contact Form",
                "specs": [
                    { "title": "submits", "tests": [{ "results": [{ "duration": 1200, "status": "passed" }] }] },
                    { "title": "validates", "tests": [{ "results": [{ "duration": 300, "status": "failed", "error": { "message": "expected visible" } }] }] }
                ]
            }]
        }, {
            "title": "cart.spec.js",
            "specs": [
                { "title": "adds", "tests": [{ "title": "adds one", "results": [{ "duration": 800, "status": "passed" }, { "status": "skipped" }] }] }
            ]
        }]
    }"#;

    fn parsed() -> ResultsFile {
        serde_json::from_str(PLAYWRIGHT_RESULTS).unwrap()
    }

    #[test]
    fn test_records_recurse_into_nested_suites() {
        let records = parsed().records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].test, "submits");
        assert_eq!(records[1].error.as_deref(), Some("expected visible"));
        assert_eq!(records[2].test, "adds one");
    }

    #[test]
    fn test_stats_aliases_and_derived_total() {
        let results = parsed();
        assert_eq!(results.stats.passed, 2);
        assert_eq!(results.stats.failed, 1);
        assert_eq!(results.stats.total(), 4);

        let explicit: ResultsFile =
            serde_json::from_str(r#"{ "stats": { "total": 9, "passed": 7, "failed": 2 } }"#).unwrap();
        assert_eq!(explicit.stats.total(), 9);
    }

    #[test]
    fn test_summary_performance_and_failures() {
        let summary = TestSummaryReport::build(&parsed(), ArtifactCounts::default(), "development");

        assert_eq!(summary.performance.slowest_test.title, "submits");
        assert_eq!(summary.performance.fastest_test.title, "validates");
        assert!((summary.performance.avg_test_duration - 766.666).abs() < 0.01);
        assert_eq!(summary.issues.failures.len(), 1);
        assert_eq!(summary.issues.failures[0].error, "expected visible");
        assert_eq!(
            summary.coverage.features_tested,
            vec!["Contact Form", "cart.spec.js", "contact.spec.js"]
        );
        assert_eq!(summary.test_run.duration, 4200);
    }

    #[test]
    fn test_empty_results_produce_zero_summary() {
        let summary = TestSummaryReport::build(&ResultsFile::default(), ArtifactCounts::default(), "ci");
        assert_eq!(summary.results, ResultCounts::default());
        assert_eq!(summary.performance.slowest_test.title, "N/A");
        assert_eq!(summary.performance.fastest_test.duration, 0.0);

        let md = summary.to_markdown();
        assert!(md.contains("- **Total Tests**: 0"));
        assert!(md.contains("- **Slowest Test**: N/A (0ms)"));
    }

    #[test]
    fn test_missing_results_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let results = ResultsFile::load(&dir.path().join("results.json")).unwrap();
        assert!(results.suites.is_empty());
        assert_eq!(results.stats.total(), 0);
    }

    #[test]
    fn test_count_files_by_extension() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.webm", ".DS_Store"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/d.png"), b"x").unwrap();

        assert_eq!(count_files(dir.path(), "png"), 2);
        assert_eq!(count_files(dir.path(), "webm"), 1);
        assert_eq!(count_files(&dir.path().join("missing"), "png"), 0);
    }

    #[test]
    fn test_performance_report_orders_durations() {
        let report = PerformanceReport::from_records(parsed().records());
        assert_eq!(report.test_durations.len(), 3);
        assert_eq!(report.metrics.slowest_tests[0].duration, 1200.0);
        assert_eq!(report.metrics.fastest_tests[0].duration, 300.0);
        assert_eq!(report.metrics.total_duration, 2300.0);
    }
}

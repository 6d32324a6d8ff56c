//! `teardown`: summarize, archive and prune artifacts

use yapee_qa_e2e::{Teardown, TeardownReport};

use super::App;
use crate::output;

pub fn finish(app: &App) -> TeardownReport {
    let report = Teardown::new((*app.config).clone(), app.layout.clone()).run();

    if let Some(summary) = &report.summary {
        output::print_info(&format!(
            "Summary: {} total, {} passed, {} failed, {} skipped",
            summary.results.total, summary.results.passed, summary.results.failed, summary.results.skipped
        ));
    }
    if let Some(dir) = &report.archive_dir {
        output::print_info(&format!("Artifacts archived in {}", dir.display()));
    }
    for step in report.steps.iter().filter(|s| !s.success) {
        output::print_error(&format!(
            "Teardown step '{}' failed: {}",
            step.step,
            step.detail.as_deref().unwrap_or("unknown error")
        ));
    }
    report
}

pub fn execute(app: &App) {
    finish(app);
}

//! Suite execution followed by the run report and teardown

use tracing::warn;

use yapee_qa_common::SuiteDescriptor;
use yapee_qa_e2e::SuiteRunner;

use super::{setup, teardown, App};
use crate::output;

/// Run one suite, write the run report, then tear down; returns overall success
pub async fn run_and_report(app: &App, suite: &SuiteDescriptor) -> anyhow::Result<bool> {
    let mut runner = SuiteRunner::new(app.registry.clone(), app.config.clone(), app.layout.clone());

    output::print_header(&format!("🎯 Running: {}", suite.display_name));
    let success = runner.run_suite(suite).await?;

    match runner.write_report() {
        Ok(path) => output::print_success(&format!("Report generated: {}", path.display())),
        Err(e) => output::print_error(&format!("Report generation failed: {}", e)),
    }
    teardown::finish(app);

    println!();
    output::print_info(&format!("🏁 Test run completed in {}ms", runner.elapsed_ms()));
    if success {
        output::print_success("All tests passed!");
    } else {
        output::print_error("Some tests failed!");
    }
    Ok(success)
}

/// `yapee-test <suite>`
pub async fn execute(app: &App, key: &str) -> anyhow::Result<i32> {
    let suite = app.registry.require(key)?.clone();

    output::print_banner(&app.config);
    if let Err(e) = setup::prepare(app).await {
        warn!("Continuing after setup failure: {}", e);
    }

    let success = run_and_report(app, &suite).await?;
    Ok(if success { 0 } else { 1 })
}

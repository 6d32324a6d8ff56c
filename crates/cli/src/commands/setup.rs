//! `setup`: prepare directories and fixtures

use tracing::debug;

use yapee_qa_e2e::{EnvironmentSetup, SetupReport};

use super::App;
use crate::output;

/// Run environment setup and report the outcome
pub async fn prepare(app: &App) -> anyhow::Result<SetupReport> {
    output::print_info("Setting up test environment...");
    let setup = EnvironmentSetup::new((*app.config).clone(), app.layout.clone());

    match setup.run().await {
        Ok(report) => {
            debug!("Setup report: {:?}", report);
            if report.structure.is_none() {
                output::print_warning("Storefront could not be checked in a browser");
            }
            output::print_success("Environment setup complete!");
            Ok(report)
        }
        Err(e) => {
            output::print_error(&format!("Environment setup failed: {}", e));
            Err(e.into())
        }
    }
}

/// Standalone `setup`: failures are reported, never fatal
pub async fn execute(app: &App) {
    let _ = prepare(app).await;
}

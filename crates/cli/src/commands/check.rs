//! `check`: storefront liveness probe

use serde::Serialize;

use yapee_qa_e2e::{probe_server, ProbeOutcome, DEFAULT_PROBE_TIMEOUT};

use super::App;
use crate::output::{self, OutputFormat, TableDisplay};

#[derive(Debug, Serialize)]
struct ProbeRow<'a> {
    url: &'a str,
    #[serde(flatten)]
    outcome: &'a ProbeOutcome,
}

impl TableDisplay for ProbeRow<'_> {
    fn headers() -> Vec<&'static str> {
        vec!["URL", "Status", "Detail"]
    }

    fn row(&self) -> Vec<String> {
        let (status, detail) = match self.outcome {
            ProbeOutcome::Running { status } => ("✅ running".to_string(), format!("HTTP {}", status)),
            ProbeOutcome::NotRunning { error } => ("❌ not running".to_string(), error.clone()),
            ProbeOutcome::TimedOut => ("⏰ timed out".to_string(), String::new()),
        };
        vec![self.url.to_string(), status, detail]
    }
}

/// Probe the configured base URL and report the result
pub async fn probe(app: &App) -> ProbeOutcome {
    output::print_info(&format!("Checking if Yapee server is running at {}...", app.config.base_url));
    let outcome = probe_server(&app.config.base_url, DEFAULT_PROBE_TIMEOUT).await;

    match &outcome {
        ProbeOutcome::Running { .. } => output::print_success("Yapee server is running!"),
        ProbeOutcome::NotRunning { error } => {
            output::print_error(&format!("Yapee server is not running: {}", error));
            output::print_warning("Please start the Yapee development server first: npm run dev");
        }
        ProbeOutcome::TimedOut => output::print_error("Server check timed out"),
    }
    outcome
}

pub async fn execute(app: &App) -> anyhow::Result<i32> {
    let outcome = probe(app).await;
    if app.format != OutputFormat::Table {
        output::print_item(
            &ProbeRow {
                url: &app.config.base_url,
                outcome: &outcome,
            },
            app.format,
        );
    }
    Ok(if outcome.is_reachable() { 0 } else { 1 })
}

//! Server liveness probe - confirm the storefront answers before running suites

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

/// Default bound for a single liveness probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Terminal outcome of a liveness probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// A response arrived; any status counts
    Running { status: u16 },
    /// The connection could not be made
    NotRunning { error: String },
    /// Nothing came back within the timeout
    TimedOut,
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Running { .. })
    }
}

/// Issue one GET against `base_url`; never fails, only classifies
pub async fn probe_server(base_url: &str, timeout: Duration) -> ProbeOutcome {
    let client = match reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            return ProbeOutcome::NotRunning {
                error: e.to_string(),
            }
        }
    };

    debug!("Probing {} (timeout {:?})", base_url, timeout);

    // The outer bound covers connect and header read together.
    match tokio::time::timeout(timeout, client.get(base_url).send()).await {
        Ok(Ok(resp)) => {
            let status = resp.status().as_u16();
            info!("Server is running at {} (HTTP {})", base_url, status);
            ProbeOutcome::Running { status }
        }
        Ok(Err(e)) if e.is_timeout() => {
            warn!("Server check timed out after {:?}", timeout);
            ProbeOutcome::TimedOut
        }
        Ok(Err(e)) => {
            warn!("Server is not running at {}: {}", base_url, e);
            ProbeOutcome::NotRunning {
                error: error_chain(&e),
            }
        }
        Err(_) => {
            warn!("Server check timed out after {:?}", timeout);
            ProbeOutcome::TimedOut
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

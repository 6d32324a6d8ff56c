//! CLI Commands

use std::sync::Arc;

use yapee_qa_common::{RunConfiguration, SuiteRegistry};
use yapee_qa_e2e::ArtifactLayout;

use crate::output::OutputFormat;

pub mod check;
pub mod interactive;
pub mod list;
pub mod run;
pub mod setup;
pub mod teardown;

/// Names accepted as the first argument besides suite keys
pub const ADMIN_COMMANDS: &[&str] = &["list", "setup", "check", "teardown"];

/// Shared state for one invocation
pub struct App {
    pub config: Arc<RunConfiguration>,
    pub registry: SuiteRegistry,
    pub layout: ArtifactLayout,
    pub format: OutputFormat,
}

impl App {
    pub fn new(config: RunConfiguration, layout: ArtifactLayout, format: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            registry: SuiteRegistry::builtin(),
            layout,
            format,
        }
    }
}

/// What the first positional argument asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Interactive,
    List,
    Setup,
    Check,
    Teardown,
    Suite(String),
    Unknown(String),
}

impl Target {
    pub fn parse(arg: Option<&str>, registry: &SuiteRegistry) -> Self {
        match arg {
            None => Target::Interactive,
            Some("list") => Target::List,
            Some("setup") => Target::Setup,
            Some("check") => Target::Check,
            Some("teardown") => Target::Teardown,
            Some(key) if registry.get(key).is_some() => Target::Suite(key.to_string()),
            Some(other) => Target::Unknown(other.to_string()),
        }
    }
}

/// Dispatch a parsed target; returns the process exit code
pub async fn dispatch(app: &App, target: Target) -> anyhow::Result<i32> {
    match target {
        Target::Interactive => interactive::execute(app).await,
        Target::List => {
            list::execute(app);
            Ok(0)
        }
        Target::Setup => {
            setup::execute(app).await;
            Ok(0)
        }
        Target::Check => check::execute(app).await,
        Target::Teardown => {
            teardown::execute(app);
            Ok(0)
        }
        Target::Suite(key) => run::execute(app, &key).await,
        Target::Unknown(name) => {
            crate::output::print_error(&format!("Unknown command: {}", name));
            crate::output::print_warning(&format!(
                "Available commands: {}, or any test suite key",
                ADMIN_COMMANDS.join(", ")
            ));
            Ok(1)
        }
    }
}

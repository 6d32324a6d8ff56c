//! Yapee QA - Main Entry Point
//!
//! `yapee-test [suite|list|setup|check|teardown]`; with no argument the
//! runner starts in interactive mode.

use std::path::PathBuf;

use clap::Parser;
use tracing::error;

use yapee_qa_cli::commands::{self, App, Target};
use yapee_qa_cli::output::{self, OutputFormat};
use yapee_qa_common::RunConfiguration;
use yapee_qa_e2e::ArtifactLayout;

/// Yapee QA - Storefront Test Automation Runner
#[derive(Parser)]
#[command(name = "yapee-test")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Suite key or admin command (list, setup, check, teardown)
    target: Option<String>,

    /// Project root holding the suites and artifact directories
    #[arg(long, env = "YAPEE_QA_ROOT", default_value = ".")]
    root: PathBuf,

    /// Output format
    #[arg(long, default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    std::panic::set_hook(Box::new(|info| {
        error!("Unexpected failure: {}", info);
        std::process::exit(1);
    }));

    let config = RunConfiguration::from_env()?;
    let app = App::new(config, ArtifactLayout::new(cli.root), cli.format);
    let target = Target::parse(cli.target.as_deref(), &app.registry);

    let code = tokio::select! {
        result = commands::dispatch(&app, target) => match result {
            Ok(code) => code,
            Err(e) => {
                output::print_error(&format!("Fatal error: {:#}", e));
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!();
            output::print_warning("Test run interrupted by user");
            0
        }
    };

    std::process::exit(code);
}

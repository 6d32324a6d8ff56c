//! Interactive mode: probe, confirm, set up, pick a suite from the menu

use tokio::io::{AsyncBufRead, BufReader};

use super::{check, list, run, setup, App};
use crate::output;
use crate::prompt;

pub async fn execute(app: &App) -> anyhow::Result<i32> {
    // One reader for the whole session so piped answers are not dropped between prompts
    let mut input = BufReader::new(tokio::io::stdin());
    execute_with(app, &mut input).await
}

/// Interactive flow reading every answer from `input`
pub async fn execute_with<R>(app: &App, input: &mut R) -> anyhow::Result<i32>
where
    R: AsyncBufRead + Unpin,
{
    output::print_banner(&app.config);

    if !check::probe(app).await.is_reachable() {
        let answer = prompt::ask_from(input, "Continue anyway? (y/N): ").await?;
        if !prompt::is_yes(&answer) {
            output::print_info("👋 Exiting...");
            return Ok(0);
        }
    }

    if setup::prepare(app).await.is_err() {
        output::print_error("Cannot continue without proper setup");
        return Ok(1);
    }

    list::show_suites(app);
    let question = format!(
        "Select test suite (1-{}) or enter suite key: ",
        app.registry.len()
    );
    let choice = prompt::ask_from(input, &question).await?;

    let Some(suite) = app.registry.resolve(&choice).cloned() else {
        output::print_error("Invalid choice!");
        return Ok(1);
    };

    let success = run::run_and_report(app, &suite).await?;
    Ok(if success { 0 } else { 1 })
}

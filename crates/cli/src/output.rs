//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use yapee_qa_common::RunConfiguration;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn table_of<T: TableDisplay>(items: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

fn print_plain<T: TableDisplay>(item: &T) {
    for (header, value) in T::headers().iter().zip(item.row().iter()) {
        println!("{}: {}", header, value);
    }
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", table_of(std::slice::from_ref(item))),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
        }
        OutputFormat::Plain => print_plain(item),
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => println!("{}", table_of(items)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                print_plain(item);
            }
        }
    }
}

/// Startup banner with the effective configuration
pub fn print_banner(config: &RunConfiguration) {
    let rule = "━".repeat(60);
    println!("{}", rule.dimmed());
    println!("{}", " 🛒 Yapee Test Automation Runner".bold().cyan());
    println!("{}", rule.dimmed());
    println!("   {} {}", "Base URL:".bold(), config.base_url);
    println!("   {} {}", "Mode:".bold(), config.mode);
    println!("   {} {}", "Headless:".bold(), config.headless);
    println!("   {} {}ms", "Timeout:".bold(), config.timeout_ms);
    println!("   {} {}", "Retries:".bold(), config.retries);
    println!("   {} {}", "Workers:".bold(), config.workers);
    println!("{}", rule.dimmed());
}

/// Section heading
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "-".repeat(40).cyan());
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).green());
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).red());
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).yellow());
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}

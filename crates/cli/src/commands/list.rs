//! `list`: show the suite catalog

use serde::Serialize;

use yapee_qa_common::SuiteDescriptor;

use super::App;
use crate::output::{self, TableDisplay};

#[derive(Debug, Serialize)]
pub struct SuiteRow {
    pub number: usize,
    pub key: String,
    pub name: String,
    pub description: String,
    pub command: String,
    /// `None` when the suite needs no file
    pub file_present: Option<bool>,
}

impl SuiteRow {
    fn new(number: usize, suite: &SuiteDescriptor, file_present: Option<bool>) -> Self {
        Self {
            number,
            key: suite.key.clone(),
            name: suite.display_name.clone(),
            description: suite.description.clone(),
            command: suite.command_line(),
            file_present,
        }
    }
}

impl TableDisplay for SuiteRow {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Key", "Name", "Description", "Command", "File"]
    }

    fn row(&self) -> Vec<String> {
        let file = match self.file_present {
            Some(true) => "✅",
            Some(false) => "❌",
            None => "-",
        };
        vec![
            self.number.to_string(),
            self.key.clone(),
            self.name.clone(),
            self.description.clone(),
            self.command.clone(),
            file.to_string(),
        ]
    }
}

pub fn rows(app: &App) -> Vec<SuiteRow> {
    app.registry
        .suites()
        .iter()
        .enumerate()
        .map(|(i, suite)| {
            SuiteRow::new(
                i + 1,
                suite,
                app.registry.file_status(suite, app.layout.root()),
            )
        })
        .collect()
}

/// Print the suite table without the banner
pub fn show_suites(app: &App) {
    output::print_header("📋 Available Test Suites:");
    output::print_list(&rows(app), app.format);
}

pub fn execute(app: &App) {
    output::print_banner(&app.config);
    show_suites(app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use yapee_qa_common::RunConfiguration;
    use yapee_qa_e2e::ArtifactLayout;

    #[test]
    fn test_rows_follow_registry_order() {
        let dir = std::env::temp_dir().join("yapee-qa-list-test-missing");
        let app = App::new(
            RunConfiguration::default(),
            ArtifactLayout::new(&dir),
            OutputFormat::Plain,
        );

        let rows = rows(&app);
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].key, "basic");
        assert_eq!(rows[0].file_present, Some(false));
        assert_eq!(rows[3].file_present, None);
        assert_eq!(rows[7].row()[0], "8");
        assert_eq!(rows[7].row()[5], "-");
    }
}

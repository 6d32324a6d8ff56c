//! Suite registry: the static catalog of invocable test suites.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// How a suite is executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Invocation {
    /// A shell command line run as a child process
    Command(String),
    /// A meta-suite that runs other registry entries in order
    Composite(Vec<String>),
}

/// A named, invocable group of automated checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteDescriptor {
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub invocation: Invocation,
    pub required_file: Option<PathBuf>,
}

impl SuiteDescriptor {
    pub fn command(
        key: &str,
        display_name: &str,
        description: &str,
        command: &str,
        required_file: Option<&str>,
    ) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            invocation: Invocation::Command(command.to_string()),
            required_file: required_file.map(PathBuf::from),
        }
    }

    pub fn composite(key: &str, display_name: &str, description: &str, members: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            invocation: Invocation::Composite(members.iter().map(|m| m.to_string()).collect()),
            required_file: None,
        }
    }

    /// Command line shown to the user
    pub fn command_line(&self) -> String {
        match &self.invocation {
            Invocation::Command(cmd) => cmd.clone(),
            Invocation::Composite(members) => format!("all of: {}", members.join(", ")),
        }
    }
}

/// Sub-suites selected by expanding a composite suite
#[derive(Debug, Default)]
pub struct Expansion<'a> {
    pub runnable: Vec<&'a SuiteDescriptor>,
    pub skipped: Vec<&'a SuiteDescriptor>,
}

/// Ordered, immutable suite catalog
#[derive(Debug, Clone)]
pub struct SuiteRegistry {
    suites: Vec<SuiteDescriptor>,
}

impl SuiteRegistry {
    pub fn new(suites: Vec<SuiteDescriptor>) -> Self {
        Self { suites }
    }

    /// The Yapee storefront suites, in menu order
    pub fn builtin() -> Self {
        Self::new(vec![
            SuiteDescriptor::command(
                "basic",
                "Basic Test Suite",
                "Selector-fallback smoke checks for contact, cart, search and product pages",
                "node test-automation-scripts.js",
                Some("test-automation-scripts.js"),
            ),
            SuiteDescriptor::command(
                "advanced",
                "Advanced Test Suite",
                "Full contact, cart and search flows with retries and validation",
                "node advanced-test-automation.js",
                Some("advanced-test-automation.js"),
            ),
            SuiteDescriptor::command(
                "playwright",
                "Playwright Test Suite",
                "Every Playwright spec across all configured browser projects",
                "npx playwright test",
                Some("playwright.config.js"),
            ),
            SuiteDescriptor::command(
                "contact",
                "Contact Form Tests",
                "In-depth checks of the contact form",
                "npx playwright test --grep \"Contact Form\"",
                None,
            ),
            SuiteDescriptor::command(
                "cart",
                "Add to Cart Tests",
                "Adding products to the cart and badge updates",
                "npx playwright test --grep \"Add to Cart\"",
                None,
            ),
            SuiteDescriptor::command(
                "search",
                "Search Functionality Tests",
                "Header, mobile and product-page search",
                "npx playwright test --grep \"Search\"",
                None,
            ),
            SuiteDescriptor::command(
                "mobile",
                "Mobile Tests",
                "The Playwright suite on a mobile Chrome viewport",
                "npx playwright test --project=\"Mobile Chrome\"",
                None,
            ),
            SuiteDescriptor::composite(
                "all",
                "All Tests",
                "Run the basic, advanced and Playwright suites one after another",
                &["basic", "advanced", "playwright"],
            ),
        ])
    }

    pub fn suites(&self) -> &[SuiteDescriptor] {
        &self.suites
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Exact key lookup
    pub fn get(&self, key: &str) -> Option<&SuiteDescriptor> {
        self.suites.iter().find(|s| s.key == key)
    }

    /// Resolve a menu selection: a 1-based index or a case-insensitive key
    pub fn resolve(&self, input: &str) -> Option<&SuiteDescriptor> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if input.bytes().all(|b| b.is_ascii_digit()) {
            let index: usize = input.parse().ok()?;
            return index.checked_sub(1).and_then(|i| self.suites.get(i));
        }

        self.suites.iter().find(|s| s.key.eq_ignore_ascii_case(input))
    }

    /// Like [`resolve`](Self::resolve) but reports a miss as an error
    pub fn require(&self, input: &str) -> Result<&SuiteDescriptor> {
        self.resolve(input)
            .ok_or_else(|| Error::SuiteNotFound(input.trim().to_string()))
    }

    /// Whether the suite's required file exists; `None` when it needs none
    pub fn file_status(&self, suite: &SuiteDescriptor, root: &Path) -> Option<bool> {
        suite.required_file.as_ref().map(|f| root.join(f).exists())
    }

    /// Fail before spawning anything when the required file is absent
    pub fn check_dependency(&self, suite: &SuiteDescriptor, root: &Path) -> Result<()> {
        match &suite.required_file {
            Some(file) if !root.join(file).exists() => Err(Error::MissingDependency {
                suite: suite.key.clone(),
                file: file.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Expand a composite suite into the members that can run from `root`
    pub fn expand<'a>(&'a self, suite: &'a SuiteDescriptor, root: &Path) -> Expansion<'a> {
        let members = match &suite.invocation {
            Invocation::Command(_) => {
                return Expansion {
                    runnable: vec![suite],
                    skipped: Vec::new(),
                }
            }
            Invocation::Composite(members) => members,
        };

        let mut expansion = Expansion::default();
        for key in members {
            let Some(member) = self.get(key) else {
                warn!("Composite suite '{}' names unknown suite '{}'", suite.key, key);
                continue;
            };
            if self.check_dependency(member, root).is_ok() {
                expansion.runnable.push(member);
            } else {
                expansion.skipped.push(member);
            }
        }
        expansion
    }
}

impl Default for SuiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

//! Environment preparation before suites run

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use yapee_qa_common::{EnvironmentSnapshot, RunConfiguration};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::{artifacts_readme, ReportTemplate, RuntimeTunables, TestData};
use crate::layout::ArtifactLayout;
use crate::page::Page;
use crate::playwright::{PlaywrightConfig, PlaywrightSession};

/// Navigation bound for the readiness check
pub const STRUCTURE_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

pub const HEADER_SELECTOR: &str = r#"header, nav, [role="banner"]"#;
pub const MAIN_SELECTOR: &str = r#"main, [role="main"], .main-content"#;

/// What the readiness check saw on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureCheck {
    pub title: String,
    pub has_header: bool,
    pub has_main: bool,
}

impl StructureCheck {
    pub fn is_complete(&self) -> bool {
        self.has_header && self.has_main
    }
}

/// Summary of one setup pass
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupReport {
    pub directories: Vec<PathBuf>,
    pub cleaned: bool,
    /// `None` when the browser check could not run
    pub structure: Option<StructureCheck>,
    pub files: Vec<PathBuf>,
}

/// Navigate to `base_url` and look for the header and main landmarks
pub async fn check_page_structure(page: &dyn Page, base_url: &str) -> E2eResult<StructureCheck> {
    page.goto(base_url, STRUCTURE_CHECK_TIMEOUT).await?;

    let title = page.title().await?;
    info!("Server is running: {}", base_url);
    info!("Page title: {}", title);

    let check = StructureCheck {
        title,
        has_header: page.count(HEADER_SELECTOR).await? > 0,
        has_main: page.count(MAIN_SELECTOR).await? > 0,
    };

    if check.is_complete() {
        info!("Essential page structure detected");
    } else {
        warn!("Basic page structure may be incomplete");
    }
    Ok(check)
}

/// Prepares artifact directories and fixture files
pub struct EnvironmentSetup {
    config: RunConfiguration,
    layout: ArtifactLayout,
}

impl EnvironmentSetup {
    pub fn new(config: RunConfiguration, layout: ArtifactLayout) -> Self {
        Self { config, layout }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Create the artifact directories; safe to repeat
    pub fn ensure_directories(&self) -> E2eResult<Vec<PathBuf>> {
        let dirs = self.layout.directories();
        for dir in &dirs {
            std::fs::create_dir_all(dir).map_err(|source| E2eError::ArtifactDirectory {
                path: dir.clone(),
                source,
            })?;
            info!("Created: {}/", dir.display());
        }
        Ok(dirs)
    }

    /// Remove everything inside the artifact directories
    pub fn clean_directories(&self) -> E2eResult<()> {
        info!("Cleaning old test artifacts...");
        for dir in self.layout.directories() {
            empty_dir(&dir).map_err(|source| E2eError::ArtifactDirectory {
                path: dir.clone(),
                source,
            })?;
            info!("Cleaned: {}/", dir.display());
        }
        Ok(())
    }

    /// Launch a browser and check the storefront home page.
    ///
    /// Never fails: problems are logged with setup instructions.
    pub async fn verify_server(&self) -> Option<StructureCheck> {
        info!("Checking Yapee server availability...");
        let base_url = &self.config.base_url;
        let pw_config = PlaywrightConfig::from_run_config(&self.config, self.layout.root());

        let result = match PlaywrightSession::launch(&pw_config).await {
            Ok(session) => {
                let check = check_page_structure(&session, base_url).await;
                if let Err(e) = session.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                check
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(check) => Some(check),
            Err(e) => {
                warn!("Failed to connect to server {}: {}", base_url, e);
                warn!(
                    "Setup instructions:\n  \
                     1. Make sure your Yapee development server is running\n  \
                     2. Verify the server is accessible at: {}\n  \
                     3. Check that all dependencies are installed\n  \
                     4. Ensure no firewall is blocking the connection",
                    base_url
                );
                warn!("Continuing with setup despite server connection issues...");
                None
            }
        }
    }

    /// Write the fixture and metadata files; returns the paths written
    pub fn write_fixtures(&self) -> E2eResult<Vec<PathBuf>> {
        let mut written = Vec::new();

        write_json(&self.layout.test_data_file(), &TestData::default())?;
        written.push(self.layout.test_data_file());

        write_json(
            &self.layout.test_config_file(),
            &RuntimeTunables::for_config(&self.config),
        )?;
        written.push(self.layout.test_config_file());

        write_json(&self.layout.report_template_file(), &ReportTemplate::new(&self.config))?;
        written.push(self.layout.report_template_file());

        write_json(
            &self.layout.environment_file(),
            &EnvironmentSnapshot::capture(&self.config),
        )?;
        written.push(self.layout.environment_file());

        let readme = artifacts_readme(&chrono::Utc::now().to_rfc3339());
        std::fs::write(self.layout.artifacts_readme_file(), readme)?;
        written.push(self.layout.artifacts_readme_file());

        for path in &written {
            info!("Created: {}", path.display());
        }
        Ok(written)
    }

    /// Full setup: directories, optional clean, server check, fixtures
    pub async fn run(&self) -> E2eResult<SetupReport> {
        info!("Starting Yapee Test Automation Setup...");

        let directories = self.ensure_directories()?;
        if self.config.clean_before_test {
            self.clean_directories()?;
        }

        let structure = self.verify_server().await;
        let files = self.write_fixtures()?;

        info!("Test setup completed successfully");
        Ok(SetupReport {
            directories,
            cleaned: self.config.clean_before_test,
            structure,
            files,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> E2eResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn empty_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        return std::fs::create_dir_all(dir);
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

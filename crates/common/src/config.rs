//! Run configuration built once from the environment.
//!
//! A [`RunConfiguration`] is constructed at process start by
//! [`RunConfiguration::from_env`] and then shared read-only. Changing any value
//! requires restarting the process.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `BASE_URL` | Storefront base URL | mode dependent, `http://localhost:5175` |
//! | `HEADLESS` | `false` shows the browser window | `true` |
//! | `SLOW_MO` | Delay between browser actions (ms) | `0` |
//! | `TIMEOUT` | Global test timeout (ms) | `30000` |
//! | `RETRIES` | Retries per failed test | `2` |
//! | `WORKERS` | Parallel Playwright workers | `4` |
//! | `NODE_ENV` | `staging` or `production` switch the target defaults | `development` |
//! | `CI` | CI mode: always record screenshots and video | unset |
//! | `DEBUG` | Debug mode: headed browser, single worker | unset |
//! | `CLEAN_BEFORE_TEST` | Empty artifact directories during setup | unset |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default storefront URL for local development
pub const DEFAULT_BASE_URL: &str = "http://localhost:5175";

/// Storefront URL used when `NODE_ENV=staging`
pub const STAGING_BASE_URL: &str = "https://staging.yapee.com";

/// Storefront URL used when `NODE_ENV=production`
pub const PRODUCTION_BASE_URL: &str = "https://yapee.com";

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_WORKERS: u32 = 4;

/// Slow-motion delay applied in debug mode unless `SLOW_MO` is set
pub const DEBUG_SLOW_MO_MS: u64 = 1_000;

pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_HEADLESS: &str = "HEADLESS";
pub const ENV_SLOW_MO: &str = "SLOW_MO";
pub const ENV_TIMEOUT: &str = "TIMEOUT";
pub const ENV_RETRIES: &str = "RETRIES";
pub const ENV_WORKERS: &str = "WORKERS";
pub const ENV_NODE_ENV: &str = "NODE_ENV";
pub const ENV_CI: &str = "CI";
pub const ENV_DEBUG: &str = "DEBUG";
pub const ENV_CLEAN_BEFORE_TEST: &str = "CLEAN_BEFORE_TEST";

/// Context the run executes in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Development,
    Staging,
    Production,
    Ci,
    Debug,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Development => "development",
            RunMode::Staging => "staging",
            RunMode::Production => "production",
            RunMode::Ci => "ci",
            RunMode::Debug => "debug",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When screenshots or videos are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapturePolicy {
    On,
    Off,
    OnlyOnFailure,
    RetainOnFailure,
}

impl CapturePolicy {
    pub fn on_failure(&self) -> bool {
        !matches!(self, CapturePolicy::Off)
    }

    pub fn on_success(&self) -> bool {
        matches!(self, CapturePolicy::On)
    }
}

/// Immutable configuration for one runner process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfiguration {
    pub base_url: String,
    pub headless: bool,
    pub slow_mo_ms: u64,
    pub timeout_ms: u64,
    pub retries: u32,
    pub workers: u32,
    pub mode: RunMode,
    pub screenshot: CapturePolicy,
    pub video: CapturePolicy,
    pub clean_before_test: bool,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            slow_mo_ms: 0,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
            workers: DEFAULT_WORKERS,
            mode: RunMode::Development,
            screenshot: CapturePolicy::OnlyOnFailure,
            video: CapturePolicy::RetainOnFailure,
            clean_before_test: false,
        }
    }
}

impl RunConfiguration {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let flag = |name: &str| get(name).map(|v| is_truthy(&v)).unwrap_or(false);

        let mode = if flag(ENV_DEBUG) {
            RunMode::Debug
        } else if flag(ENV_CI) {
            RunMode::Ci
        } else {
            match get(ENV_NODE_ENV).as_deref().map(str::trim) {
                Some("production") => RunMode::Production,
                Some("staging") => RunMode::Staging,
                _ => RunMode::Development,
            }
        };

        let mut config = Self::defaults_for(mode);

        if let Some(url) = get(ENV_BASE_URL) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(headless) = get(ENV_HEADLESS) {
            config.headless = headless.trim() != "false";
        }
        if let Some(value) = get(ENV_SLOW_MO) {
            config.slow_mo_ms = parse_number(ENV_SLOW_MO, &value)?;
        }
        if let Some(value) = get(ENV_TIMEOUT) {
            config.timeout_ms = parse_number(ENV_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_RETRIES) {
            config.retries = parse_number(ENV_RETRIES, &value)?;
        }
        if let Some(value) = get(ENV_WORKERS) {
            config.workers = parse_number(ENV_WORKERS, &value)?;
        }
        config.clean_before_test = flag(ENV_CLEAN_BEFORE_TEST);

        // Debug runs are always headed and serial.
        if mode == RunMode::Debug {
            config.headless = false;
            config.workers = 1;
        }

        Ok(config)
    }

    /// Defaults before any explicit variable is applied
    pub fn defaults_for(mode: RunMode) -> Self {
        let base = Self {
            mode,
            ..Self::default()
        };

        match mode {
            RunMode::Development => base,
            RunMode::Staging => Self {
                base_url: STAGING_BASE_URL.to_string(),
                retries: 2,
                ..base
            },
            RunMode::Production => Self {
                base_url: PRODUCTION_BASE_URL.to_string(),
                retries: 3,
                workers: 2,
                ..base
            },
            RunMode::Ci => Self {
                workers: 1,
                screenshot: CapturePolicy::On,
                video: CapturePolicy::On,
                ..base
            },
            RunMode::Debug => Self {
                headless: false,
                slow_mo_ms: DEBUG_SLOW_MO_MS,
                retries: 0,
                workers: 1,
                ..base
            },
        }
    }

    /// Variables exported to spawned suite processes
    pub fn child_env(&self) -> Vec<(&'static str, String)> {
        vec![
            (ENV_BASE_URL, self.base_url.clone()),
            (ENV_HEADLESS, self.headless.to_string()),
            (ENV_SLOW_MO, self.slow_mo_ms.to_string()),
            (ENV_TIMEOUT, self.timeout_ms.to_string()),
            (ENV_RETRIES, self.retries.to_string()),
            (ENV_WORKERS, self.workers.to_string()),
        ]
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off")
}

fn parse_number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::InvalidConfig {
        var: var.to_string(),
        value: value.to_string(),
    })
}

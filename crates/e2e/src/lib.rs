//! Yapee QA E2E Orchestration
//!
//! This crate drives test runs against the Yapee storefront:
//! - Probes the storefront over HTTP before anything runs
//! - Prepares artifact directories and fixture files
//! - Runs registry suites as child processes and records their results
//! - Summarizes, archives and prunes artifacts after a run
//! - Drives a live browser page through a Playwright bridge
//! - Wraps contact, cart and search workflows in reusable testers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     yapee-test (CLI)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  probe_server(base_url) -> ProbeOutcome                      │
//! │  EnvironmentSetup::run() -> SetupReport                      │
//! │    └── verify_server() ── PlaywrightSession (impl Page)      │
//! │  SuiteRunner                                                 │
//! │    ├── run_suite(descriptor) -> bool                         │
//! │    ├── execute(descriptor) -> ExecutionResult  (sh -c ...)   │
//! │    └── write_report() -> test-results/run-report.json        │
//! │  Teardown::run() -> TeardownReport                           │
//! │    ├── summary      test-summary.{json,md}                   │
//! │    ├── archive      test-results/runs/run-<ts>/              │
//! │    ├── cleanup      *.tmp, .DS_Store, .gitkeep               │
//! │    ├── performance  performance-report.json                  │
//! │    └── retention    newest 10 runs                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  testers::{ContactFormTester, AddToCartTester, SearchTester} │
//! │    over &dyn Page, with retry::{with_retry, wait_until}      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod fixtures;
pub mod layout;
pub mod page;
pub mod playwright;
pub mod retry;
pub mod runner;
pub mod server;
pub mod setup;
pub mod summary;
pub mod teardown;
pub mod testers;

pub use error::{E2eError, E2eResult};
pub use layout::ArtifactLayout;
pub use page::{LoadState, Page, WaitState};
pub use playwright::{PlaywrightConfig, PlaywrightSession};
pub use retry::{wait_until, with_retry, RetryPolicy};
pub use runner::{RunReport, SuiteRunner};
pub use server::{probe_server, ProbeOutcome, DEFAULT_PROBE_TIMEOUT};
pub use setup::{EnvironmentSetup, SetupReport, StructureCheck};
pub use teardown::{Teardown, TeardownReport, MAX_ARCHIVED_RUNS};

//! Yapee QA Common Library
//!
//! Shared configuration, the suite registry and result types used by the
//! Yapee storefront test-automation crates.

pub mod config;
pub mod error;
pub mod suite;
pub mod types;

// Re-export commonly used types
pub use config::{CapturePolicy, RunConfiguration, RunMode};
pub use error::{Error, Result};
pub use suite::{Expansion, Invocation, SuiteDescriptor, SuiteRegistry};
pub use types::{EnvironmentSnapshot, ExecutionResult, RunTotals};

/// Yapee QA version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Error types for Yapee QA

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the shared Yapee QA error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared across the Yapee QA crates
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Test suite '{0}' not found")]
    SuiteNotFound(String),

    #[error("Required file not found for suite '{suite}': {}", file.display())]
    MissingDependency { suite: String, file: PathBuf },

    #[error("Invalid configuration: {var}={value:?}")]
    InvalidConfig { var: String, value: String },
}

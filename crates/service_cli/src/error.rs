//! Error types for the dealval CLI.

use thiserror::Error;
use valuation_core::types::ValuationError;

use crate::config::ConfigError;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Deal file could not be parsed
    #[error("Invalid deal file {path}: {source}")]
    DealFile {
        /// Path as given on the command line
        path: String,
        /// Parser error
        source: serde_json::Error,
    },

    /// Symbol not present in the deal file
    #[error("Unknown company: {0}")]
    UnknownCompany(String),

    /// Model inputs could not be built
    #[error("Valuation error: {0}")]
    Valuation(#[from] ValuationError),

    /// Rendering failed
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create an output error
    pub fn output(msg: impl ToString) -> Self {
        Self::Output(msg.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::output(e)
    }
}

impl From<csv::Error> for CliError {
    fn from(e: csv::Error) -> Self {
        Self::output(e)
    }
}

/// Result alias for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;

//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No documents found to process
    #[error("No PDF documents found in {0}")]
    NoDocuments(String),

    /// Report rendering error
    #[error("Report error: {0}")]
    Report(#[from] marginalia_report::ReportError),
}

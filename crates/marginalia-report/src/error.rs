//! Error types for report rendering

use thiserror::Error;

/// Errors that can occur while writing report artifacts
#[derive(Error, Debug)]
pub enum ReportError {
    /// Failed to write the artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output path has no parent directory to create
    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

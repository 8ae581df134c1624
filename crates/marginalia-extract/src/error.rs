//! Error types for page extraction

use thiserror::Error;

/// Errors that can occur while extracting pages from a document
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The PDF is malformed or corrupted
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// The PDF requires a password
    #[error("PDF is password protected")]
    PasswordProtected,

    /// Text extraction failed for another reason
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// I/O error reading the document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

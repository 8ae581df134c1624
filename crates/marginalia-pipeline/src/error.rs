//! Error types for the pipeline

use thiserror::Error;

/// Errors that can occur while running the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Completion client failure that is not worth retrying
    #[error("Completion error: {0}")]
    Completion(String),

    /// Retry budget exhausted on transient failures
    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made, including the first
        attempts: u32,
        /// The failure that ended the final attempt
        last_error: String,
    },

    /// The completion service returned a payload the parser cannot accept
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::JsonParse(e.to_string())
    }
}

impl PipelineError {
    /// Whether this error ended a call after the full retry budget
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, PipelineError::RetriesExhausted { .. })
    }
}

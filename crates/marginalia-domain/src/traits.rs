//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline core and
//! infrastructure. Implementations live in other crates: page sources in
//! marginalia-extract, completion clients and tokenizers in
//! marginalia-llm, renderers in marginalia-report.

use crate::{InsightRecord, Page, Prompt};
use std::path::{Path, PathBuf};

/// Trait for producing the ordered page sequence of a document
///
/// Implemented by the infrastructure layer (marginalia-extract)
pub trait PageSource {
    /// Error type for extraction operations
    type Error;

    /// Extract the ordered page sequence of the document at `path`.
    ///
    /// Never returns an empty sequence: a document yielding no text at all
    /// produces a single page with empty text.
    fn pages(&self, path: &Path) -> Result<Vec<Page>, Self::Error>;
}

/// Opaque token-counting capability.
///
/// The pipeline treats tokenization as a black box; when no tokenizer is
/// available for a model, routing degrades to the full-document path.
pub trait Tokenizer {
    /// Count the tokens in `text`
    fn count_tokens(&self, text: &str) -> usize;
}

/// How a completion failure should be handled by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth retrying: rate limits, timeouts, network faults
    Transient,
    /// Retrying cannot help: auth failures, unknown models, schema errors
    Permanent,
}

/// Trait for completion service operations
///
/// Implemented by the infrastructure layer (marginalia-llm). A client is
/// single-shot: retry, backoff and pacing are the orchestrator's job.
pub trait CompletionClient {
    /// Error type for completion operations
    type Error: std::error::Error;

    /// Send one prompt and return the raw structured-response text
    fn complete(&self, prompt: &Prompt) -> Result<String, Self::Error>;

    /// Classify a failure for the orchestrator's retry decision.
    ///
    /// The default treats every failure as transient, preserving blanket
    /// retry for clients that cannot tell their errors apart.
    fn classify(&self, _error: &Self::Error) -> FailureKind {
        FailureKind::Transient
    }
}

/// Trait for rendering collected insight records into an output artifact
///
/// Implemented by the presentation layer (marginalia-report). The core
/// makes no assumption about the artifact's format.
pub trait InsightRenderer {
    /// Error type for render operations
    type Error;

    /// Render `records` for one (document, case) pair to `output_path`,
    /// returning the path of the written artifact.
    fn render(
        &self,
        records: &[InsightRecord],
        source_id: &str,
        case_text: &str,
        model: &str,
        output_path: &Path,
    ) -> Result<PathBuf, Self::Error>;
}

//! Marginalia Domain Layer
//!
//! Core types and trait seams for the marginalia insight-extraction
//! pipeline. This crate has no external dependencies: it defines the
//! values that flow through the pipeline and the boundaries behind which
//! infrastructure lives.
//!
//! ## Key Concepts
//!
//! - **Page**: one atomic extracted slice of document text with a position
//! - **Prompt**: the ordered sequence of role-tagged blocks sent to the
//!   completion service (exactly one instruction block, first; the task
//!   block last)
//! - **InsightRecord**: the structured result of one completion call -
//!   contextual summary plus extracted quotes
//!
//! ## Architecture
//!
//! Trait definitions for all external interactions live in [`traits`];
//! implementations live in the infrastructure crates (marginalia-extract,
//! marginalia-llm, marginalia-report). The pipeline crate depends only on
//! this one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod insight;
pub mod page;
pub mod prompt;
pub mod traits;

// Re-exports for convenience
pub use insight::{InsightRecord, Quote};
pub use page::Page;
pub use prompt::{MessageBlock, Prompt, Role};
pub use traits::{CompletionClient, FailureKind, InsightRenderer, PageSource, Tokenizer};

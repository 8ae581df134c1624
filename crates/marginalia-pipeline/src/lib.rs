//! Marginalia Pipeline
//!
//! The orchestration core: token-bounded batching, prompt assembly,
//! resilient execution and per-document run loops.
//!
//! # Flow
//!
//! For each (document, case) pair the [`Runner`] counts tokens over the
//! page sequence and routes it:
//!
//! - below the full-document threshold: one request carrying every page
//! - at or above it: the [`TokenBatcher`] groups pages under the batch
//!   ceiling and each batch goes out as its own request
//!
//! Every request runs through the [`Executor`], which retries transient
//! failures with capped exponential backoff and paces successes with a
//! fixed cooldown. Failures are isolated per (document, case): the
//! [`CaseOutcome`] carries whatever records were gathered plus the
//! failure, and the other cases keep running.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batching;
pub mod cases;
pub mod config;
pub mod error;
pub mod executor;
pub mod parser;
pub mod prompt;
pub mod runner;

pub use batching::{Batch, TokenBatcher};
pub use cases::{Case, CaseSet};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use executor::{Executor, RetryPolicy};
pub use parser::parse_insight_response;
pub use prompt::{PromptAssembler, DEFAULT_INSTRUCTION};
pub use runner::{CaseOutcome, DocumentRun, Runner};

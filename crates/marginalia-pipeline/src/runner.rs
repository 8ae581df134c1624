//! Per-document run orchestration
//!
//! Routes each (document, case) pair to the full-document or batched
//! path, drives the executor over the resulting prompts, and isolates
//! failures at the case level: one case failing never stops the other
//! cases of the same document.

use crate::batching::TokenBatcher;
use crate::cases::{Case, CaseSet};
use crate::config::PipelineConfig;
use crate::executor::Executor;
use crate::prompt::PromptAssembler;
use marginalia_domain::traits::{CompletionClient, Tokenizer};
use marginalia_domain::{InsightRecord, Page};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything gathered for one (document, case) pair.
///
/// A failed outcome still carries the records gathered before the
/// failure, so partial batched results are reportable.
#[derive(Debug)]
pub struct CaseOutcome {
    /// Name of the case this outcome belongs to
    pub case_name: String,

    /// Insight records gathered, one per completed request
    pub records: Vec<InsightRecord>,

    /// Terminal failure, if the case did not run to completion
    pub failure: Option<String>,

    /// Requests planned for this case (1 on the full-document path)
    pub batches_total: usize,

    /// Requests that completed before the run ended
    pub batches_completed: usize,
}

impl CaseOutcome {
    /// Whether every planned request completed
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Outcomes for every case of one document
#[derive(Debug)]
pub struct DocumentRun {
    /// Identity of the source document
    pub source_id: String,

    /// One outcome per case, in case-set order
    pub outcomes: Vec<CaseOutcome>,
}

impl DocumentRun {
    /// Number of cases that did not run to completion
    pub fn failed_cases(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_complete()).count()
    }
}

/// Drives documents and cases through the executor
pub struct Runner<C>
where
    C: CompletionClient,
{
    executor: Executor<C>,
    assembler: PromptAssembler,
    config: PipelineConfig,
    tokenizer: Option<Arc<dyn Tokenizer + Send + Sync>>,
}

impl<C> Runner<C>
where
    C: CompletionClient + Send + Sync + 'static,
    C::Error: Send + 'static,
{
    /// Create a runner.
    ///
    /// Without a tokenizer, routing degrades to the full-document path
    /// for every case; batching needs token counts.
    pub fn new(
        executor: Executor<C>,
        assembler: PromptAssembler,
        config: PipelineConfig,
        tokenizer: Option<Arc<dyn Tokenizer + Send + Sync>>,
    ) -> Self {
        Self {
            executor,
            assembler,
            config,
            tokenizer,
        }
    }

    /// Run every case of the set against one document's pages
    pub async fn run_document(&self, pages: &[Page], cases: &CaseSet) -> DocumentRun {
        let source_id = pages
            .first()
            .map(|p| p.source_id.clone())
            .unwrap_or_default();

        let mut outcomes = Vec::with_capacity(cases.len());
        for case in cases.iter() {
            debug!(case = %case.name, source = %source_id, "running case");
            let outcome = self.run_case(pages, case).await;
            if let Some(failure) = &outcome.failure {
                warn!(
                    case = %case.name,
                    source = %source_id,
                    error = %failure,
                    completed = outcome.batches_completed,
                    planned = outcome.batches_total,
                    "case ended with failure"
                );
            }
            outcomes.push(outcome);
        }

        info!(
            source = %source_id,
            cases = outcomes.len(),
            failed = outcomes.iter().filter(|o| !o.is_complete()).count(),
            "document run finished"
        );
        DocumentRun {
            source_id,
            outcomes,
        }
    }

    /// Run one case against one document's pages.
    ///
    /// Documents whose total token count stays below the configured
    /// threshold go out as one full-document request; larger ones are
    /// batched. With no tokenizer available the full-document path is
    /// used unconditionally.
    pub async fn run_case(&self, pages: &[Page], case: &Case) -> CaseOutcome {
        match &self.tokenizer {
            Some(tokenizer) => {
                let total: usize = pages
                    .iter()
                    .map(|p| tokenizer.count_tokens(&p.text))
                    .sum();
                if total < self.config.full_document_threshold {
                    debug!(total, "routing to full-document path");
                    self.run_full(pages, case).await
                } else {
                    debug!(total, "routing to batched path");
                    self.run_batched(pages, case, tokenizer.as_ref()).await
                }
            }
            None => {
                warn!("no tokenizer available, forcing full-document path");
                self.run_full(pages, case).await
            }
        }
    }

    async fn run_full(&self, pages: &[Page], case: &Case) -> CaseOutcome {
        let prompt = self.assembler.full_document(pages, &case.text);
        match self.executor.execute(&prompt).await {
            Ok(record) => CaseOutcome {
                case_name: case.name.clone(),
                records: vec![record],
                failure: None,
                batches_total: 1,
                batches_completed: 1,
            },
            Err(e) => CaseOutcome {
                case_name: case.name.clone(),
                records: Vec::new(),
                failure: Some(e.to_string()),
                batches_total: 1,
                batches_completed: 0,
            },
        }
    }

    async fn run_batched(
        &self,
        pages: &[Page],
        case: &Case,
        tokenizer: &(dyn Tokenizer + Send + Sync),
    ) -> CaseOutcome {
        let batcher = TokenBatcher::new(self.config.batch_token_ceiling);
        let batches = batcher.batch(pages, tokenizer);

        let mut records = Vec::new();
        let mut failure = None;
        let batches_total = batches.len();

        for (index, batch) in batches.iter().enumerate() {
            debug!(
                batch = index + 1,
                of = batches_total,
                tokens = batch.token_count,
                "executing batch"
            );
            let prompt = self.assembler.batched(&batch.text, &case.text);
            match self.executor.execute(&prompt).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    // Remaining batches are skipped; records so far are kept.
                    failure = Some(e.to_string());
                    break;
                }
            }
        }

        let batches_completed = records.len();
        CaseOutcome {
            case_name: case.name.clone(),
            records,
            failure,
            batches_total,
            batches_completed,
        }
    }
}

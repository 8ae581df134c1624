//! Token-bounded batching of page sequences
//!
//! Greedy, single-pass, first-fit grouping: pages are accumulated in
//! order until the next page would push the accumulator past the token
//! ceiling, at which point the accumulator is closed and a new one is
//! seeded with that page. Pages are never reordered or split to improve
//! fill; packing efficiency is traded for strict provenance ordering.

use marginalia_domain::traits::Tokenizer;
use marginalia_domain::Page;
use tracing::debug;

/// A token-bounded grouping of consecutive pages sent as one request.
///
/// `token_count` is recomputed over the joined text when the batch is
/// closed, so it always equals `tokenizer.count_tokens(&text)`.
#[derive(Debug, Clone)]
pub struct Batch {
    /// The pages this batch covers, in document order
    pub pages: Vec<Page>,

    /// Concatenated text of the covered pages
    pub text: String,

    /// Token count of `text`
    pub token_count: usize,
}

/// Groups an ordered page sequence into token-bounded batches
#[derive(Debug, Clone, Copy)]
pub struct TokenBatcher {
    ceiling: usize,
}

impl TokenBatcher {
    /// Create a batcher with the given per-batch token ceiling
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling }
    }

    /// Partition `pages` into ordered batches.
    ///
    /// Every batch stays at or below the ceiling, with one exception: a
    /// single page whose own token count exceeds the ceiling becomes an
    /// oversized singleton batch. There is no truncation policy; the
    /// completion service may still reject such a request.
    pub fn batch(&self, pages: &[Page], tokenizer: &dyn Tokenizer) -> Vec<Batch> {
        let mut batches = Vec::new();
        let mut acc_pages: Vec<Page> = Vec::new();
        let mut acc_text = String::new();

        for page in pages {
            let acc_tokens = tokenizer.count_tokens(&acc_text);
            let page_tokens = tokenizer.count_tokens(&page.text);

            if !acc_pages.is_empty() && acc_tokens + page_tokens > self.ceiling {
                debug!(
                    page = page.number,
                    acc_tokens, page_tokens, "closing batch at token ceiling"
                );
                batches.push(close_batch(
                    std::mem::take(&mut acc_pages),
                    std::mem::take(&mut acc_text),
                    tokenizer,
                ));
            }

            acc_pages.push(page.clone());
            acc_text.push_str(&page.text);
        }

        // The trailing accumulator is a batch too.
        if !acc_pages.is_empty() {
            batches.push(close_batch(acc_pages, acc_text, tokenizer));
        }

        debug!(batches = batches.len(), pages = pages.len(), "batched pages");
        batches
    }
}

fn close_batch(pages: Vec<Page>, text: String, tokenizer: &dyn Tokenizer) -> Batch {
    let token_count = tokenizer.count_tokens(&text);
    Batch {
        pages,
        text,
        token_count,
    }
}

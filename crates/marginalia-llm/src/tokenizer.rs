//! Token-count estimation for routing decisions
//!
//! The pipeline only needs token counts to route between the full-document
//! and batched paths and to bound batch sizes, so an estimate is enough.
//! Roughly 4 characters per token holds for latin-script prose on the
//! GPT-family encoders.

use marginalia_domain::traits::Tokenizer;

/// Approximate chars-per-token ratio for GPT-family models
const GPT_CHARS_PER_TOKEN: usize = 4;

/// Character-count based token estimator
#[derive(Debug, Clone, Copy)]
pub struct EstimatingTokenizer {
    chars_per_token: usize,
}

impl EstimatingTokenizer {
    /// Create an estimator with an explicit chars-per-token ratio
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    /// Look up an estimator for a model identifier.
    ///
    /// Returns `None` for model families without a known ratio; callers
    /// degrade to token-unaware routing in that case.
    pub fn for_model(model: &str) -> Option<Self> {
        let family_known = ["gpt-", "chatgpt", "o1", "o3", "o4"]
            .iter()
            .any(|prefix| model.starts_with(prefix));
        family_known.then(|| Self::new(GPT_CHARS_PER_TOKEN))
    }
}

impl Tokenizer for EstimatingTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }
}

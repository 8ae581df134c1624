//! Marginalia Completion Client Layer
//!
//! Pluggable completion-service clients behind the domain's
//! `CompletionClient` trait, plus tokenizer estimates for routing.
//!
//! # Clients
//!
//! - `MockClient`: deterministic, scriptable mock for testing
//! - `OpenAiClient`: OpenAI-compatible chat-completions API over HTTP
//!
//! Clients are single-shot: the pipeline's executor owns retry, backoff
//! and pacing, so a client reports each failure exactly once, classified
//! as transient or permanent.
//!
//! # Examples
//!
//! ```
//! use marginalia_llm::MockClient;
//! use marginalia_domain::{CompletionClient, Prompt};
//!
//! let client = MockClient::new("{}");
//! let prompt = Prompt::from_instruction("extract").with_task("case");
//! assert_eq!(client.complete(&prompt).unwrap(), "{}");
//! ```

#![warn(missing_docs)]

pub mod openai;
pub mod tokenizer;

use marginalia_domain::traits::{CompletionClient as CompletionClientTrait, FailureKind};
use marginalia_domain::Prompt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::OpenAiClient;
pub use tokenizer::EstimatingTokenizer;

/// Errors that can occur during completion operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Invalid response from the completion service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Authentication or authorization failure
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Generic error
    #[error("Completion error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether a retry has any chance of succeeding.
    ///
    /// Communication faults and rate limits are transient; a rejected key,
    /// an unknown model or a malformed response will not improve on retry.
    /// Unclassified errors count as transient so that blanket retry stays
    /// the fallback behavior.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Communication(_) | LlmError::RateLimitExceeded | LlmError::Other(_) => true,
            LlmError::InvalidResponse(_) | LlmError::ModelNotAvailable(_) | LlmError::Auth(_) => {
                false
            }
        }
    }
}

/// One scripted outcome for the mock client
#[derive(Debug, Clone)]
enum ScriptedOutcome {
    Respond(String),
    FailTransient(String),
    FailPermanent(String),
}

/// Mock completion client for deterministic testing
///
/// Returns a fixed response, optionally preceded by a scripted sequence of
/// failures or alternate responses. No network calls are made.
///
/// # Examples
///
/// ```
/// use marginalia_llm::MockClient;
/// use marginalia_domain::{CompletionClient, Prompt};
///
/// let client = MockClient::new("ok").fail_times(2);
/// let prompt = Prompt::from_instruction("i").with_task("t");
/// assert!(client.complete(&prompt).is_err());
/// assert!(client.complete(&prompt).is_err());
/// assert_eq!(client.complete(&prompt).unwrap(), "ok");
/// assert_eq!(client.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockClient {
    default_response: String,
    script: Arc<Mutex<VecDeque<ScriptedOutcome>>>,
    call_count: Arc<Mutex<usize>>,
    fail_always: bool,
}

impl MockClient {
    /// Create a mock that returns `response` for every prompt
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            fail_always: false,
        }
    }

    /// Fail the next `n` calls with a transient error, then fall through
    /// to the remaining script or the default response
    pub fn fail_times(self, n: usize) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            for _ in 0..n {
                script.push_back(ScriptedOutcome::FailTransient(
                    "scripted transient failure".to_string(),
                ));
            }
        }
        self
    }

    /// Fail every call with a transient error
    pub fn fail_always(mut self) -> Self {
        self.fail_always = true;
        self
    }

    /// Fail the next call with a permanent error
    pub fn fail_permanent_once(self) -> Self {
        self.script.lock().unwrap().push_back(ScriptedOutcome::FailPermanent(
            "scripted permanent failure".to_string(),
        ));
        self
    }

    /// Queue a specific response ahead of the default one
    pub fn push_response(self, response: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedOutcome::Respond(response.into()));
        self
    }

    /// Number of times `complete` was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl CompletionClientTrait for MockClient {
    type Error = LlmError;

    fn complete(&self, _prompt: &Prompt) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        if self.fail_always {
            return Err(LlmError::Communication("scripted failure".to_string()));
        }

        match self.script.lock().unwrap().pop_front() {
            Some(ScriptedOutcome::Respond(r)) => Ok(r),
            Some(ScriptedOutcome::FailTransient(msg)) => Err(LlmError::Communication(msg)),
            Some(ScriptedOutcome::FailPermanent(msg)) => Err(LlmError::Auth(msg)),
            None => Ok(self.default_response.clone()),
        }
    }

    fn classify(&self, error: &Self::Error) -> FailureKind {
        if error.is_transient() {
            FailureKind::Transient
        } else {
            FailureKind::Permanent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt::from_instruction("i").with_task("t")
    }

    #[test]
    fn test_mock_default_response() {
        let client = MockClient::new("response");
        assert_eq!(client.complete(&prompt()).unwrap(), "response");
    }

    #[test]
    fn test_mock_call_count() {
        let client = MockClient::new("r");
        assert_eq!(client.call_count(), 0);
        client.complete(&prompt()).unwrap();
        client.complete(&prompt()).unwrap();
        assert_eq!(client.call_count(), 2);
        client.reset_call_count();
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_mock_fail_times_then_succeed() {
        let client = MockClient::new("ok").fail_times(2);
        assert!(client.complete(&prompt()).is_err());
        assert!(client.complete(&prompt()).is_err());
        assert_eq!(client.complete(&prompt()).unwrap(), "ok");
    }

    #[test]
    fn test_mock_fail_always() {
        let client = MockClient::new("never").fail_always();
        for _ in 0..10 {
            assert!(client.complete(&prompt()).is_err());
        }
    }

    #[test]
    fn test_mock_scripted_response_order() {
        let client = MockClient::new("default").push_response("first");
        assert_eq!(client.complete(&prompt()).unwrap(), "first");
        assert_eq!(client.complete(&prompt()).unwrap(), "default");
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let client1 = MockClient::new("r");
        let client2 = client1.clone();
        client1.complete(&prompt()).unwrap();
        assert_eq!(client2.call_count(), 1);
    }

    #[test]
    fn test_classification() {
        let client = MockClient::default();
        assert_eq!(
            client.classify(&LlmError::RateLimitExceeded),
            FailureKind::Transient
        );
        assert_eq!(
            client.classify(&LlmError::Auth("bad key".to_string())),
            FailureKind::Permanent
        );
    }

    #[test]
    fn test_transient_split() {
        assert!(LlmError::Communication("x".to_string()).is_transient());
        assert!(LlmError::RateLimitExceeded.is_transient());
        assert!(LlmError::Other("x".to_string()).is_transient());
        assert!(!LlmError::InvalidResponse("x".to_string()).is_transient());
        assert!(!LlmError::ModelNotAvailable("x".to_string()).is_transient());
        assert!(!LlmError::Auth("x".to_string()).is_transient());
    }
}

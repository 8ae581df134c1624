//! Resilient execution of assembled prompts
//!
//! One [`Executor::execute`] call drives the state machine for a single
//! completion request: attempt, classify any failure, back off and retry
//! transient ones within the attempt budget, fail fast on permanent ones,
//! and pace successful calls with a fixed cooldown so the external
//! service's rate limits are respected. All waiting happens as blocking
//! delays on the single sequential task; there is no parallel dispatch.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::parser::parse_insight_response;
use marginalia_domain::traits::{CompletionClient, FailureKind};
use marginalia_domain::{InsightRecord, Prompt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry, backoff and pacing parameters for one executor
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per call, including the first
    pub max_attempts: u32,

    /// Base wait of the exponential backoff
    pub base: Duration,

    /// Lower bound on any backoff wait
    pub floor: Duration,

    /// Upper bound on any backoff wait
    pub cap: Duration,

    /// Fixed pause after each successful call; distinct from backoff
    pub cooldown: Duration,
}

impl RetryPolicy {
    /// Derive a policy from pipeline configuration.
    ///
    /// The backoff floor is pinned at one second; only the base, cap and
    /// cooldown are configurable.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base: Duration::from_secs(config.backoff_base_secs),
            floor: Duration::from_secs(1),
            cap: Duration::from_secs(config.backoff_cap_secs),
            cooldown: config.cooldown(),
        }
    }

    /// Wait before the retry that follows failed attempt `attempt` (1-based):
    /// `base * 2^(attempt-1)`, clamped to `[floor, cap]`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base.saturating_mul(factor).clamp(self.floor, self.cap)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Dispatches prompts to a completion client with bounded retry
pub struct Executor<C>
where
    C: CompletionClient,
{
    client: Arc<C>,
    policy: RetryPolicy,
}

impl<C> Executor<C>
where
    C: CompletionClient + Send + Sync + 'static,
    C::Error: Send + 'static,
{
    /// Create an executor over a completion client
    pub fn new(client: C, policy: RetryPolicy) -> Self {
        Self {
            client: Arc::new(client),
            policy,
        }
    }

    /// The active retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute one prompt to a parsed [`InsightRecord`].
    ///
    /// Transient failures are retried up to the attempt budget with
    /// exponentially increasing, capped waits; permanent failures and
    /// unparseable payloads surface immediately. After a success the
    /// executor sleeps the cooldown before returning, so the caller's
    /// next call is paced unconditionally.
    pub async fn execute(&self, prompt: &Prompt) -> Result<InsightRecord, PipelineError> {
        let mut attempt: u32 = 1;

        loop {
            let client = Arc::clone(&self.client);
            let call_prompt = prompt.clone();

            // The client trait is blocking; run it off the async thread.
            let outcome = tokio::task::spawn_blocking(move || client.complete(&call_prompt))
                .await
                .map_err(|e| PipelineError::Completion(format!("Task join error: {}", e)))?;

            match outcome {
                Ok(raw) => {
                    debug!(attempt, chars = raw.len(), "completion call succeeded");
                    let record = parse_insight_response(&raw)?;
                    if !self.policy.cooldown.is_zero() {
                        sleep(self.policy.cooldown).await;
                    }
                    return Ok(record);
                }
                Err(e) => {
                    if self.client.classify(&e) == FailureKind::Permanent {
                        warn!(error = %e, attempt, "permanent completion failure, not retrying");
                        return Err(PipelineError::Completion(e.to_string()));
                    }
                    if attempt >= self.policy.max_attempts {
                        return Err(PipelineError::RetriesExhausted {
                            attempts: attempt,
                            last_error: e.to_string(),
                        });
                    }
                    let wait = self.policy.backoff(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "transient completion failure, backing off"
                    );
                    sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}

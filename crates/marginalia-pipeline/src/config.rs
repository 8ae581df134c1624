//! Configuration for the pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for batching, routing and resilient execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Documents whose total token count is below this go out as a single
    /// full-document request; everything else is batched
    pub full_document_threshold: usize,

    /// Maximum tokens per batch on the batched path
    pub batch_token_ceiling: usize,

    /// Attempts per completion call, including the first
    pub max_attempts: u32,

    /// Base of the exponential backoff between retry attempts (seconds)
    pub backoff_base_secs: u64,

    /// Ceiling on a single backoff wait (seconds)
    pub backoff_cap_secs: u64,

    /// Fixed pacing pause after each successful call (seconds); distinct
    /// from retry backoff
    pub cooldown_secs: u64,
}

impl PipelineConfig {
    /// Get the cooldown as a Duration
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.full_document_threshold == 0 {
            return Err("full_document_threshold must be greater than 0".to_string());
        }
        if self.batch_token_ceiling == 0 {
            return Err("batch_token_ceiling must be greater than 0".to_string());
        }
        if self.batch_token_ceiling > self.full_document_threshold {
            return Err("batch_token_ceiling cannot exceed full_document_threshold".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.backoff_base_secs == 0 {
            return Err("backoff_base_secs must be greater than 0".to_string());
        }
        if self.backoff_cap_secs < self.backoff_base_secs {
            return Err("backoff_cap_secs cannot be below backoff_base_secs".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for PipelineConfig {
    /// Defaults sized for GPT-family context windows: the full-document
    /// threshold sits an order of magnitude above the per-batch ceiling.
    fn default() -> Self {
        Self {
            full_document_threshold: 64_000,
            batch_token_ceiling: 8_000,
            max_attempts: 5,
            backoff_base_secs: 1,
            backoff_cap_secs: 60,
            cooldown_secs: 30,
        }
    }
}

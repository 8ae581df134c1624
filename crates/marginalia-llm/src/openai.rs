//! OpenAI-compatible chat-completions client
//!
//! Sends an assembled prompt to a `/chat/completions` endpoint and returns
//! the raw structured-response text. Instruction and context blocks travel
//! as `system` messages, the task block as the `user` message, and the
//! request pins a JSON-schema response format so the service answers with
//! one insight payload.
//!
//! The client makes exactly one attempt per call; retry, backoff and
//! pacing are owned by the pipeline executor.

use crate::LlmError;
use marginalia_domain::traits::{CompletionClient as CompletionClientTrait, FailureKind};
use marginalia_domain::{Prompt, Role};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default timeout for completion requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// OpenAI-compatible completion client
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new client
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g. "https://api.openai.com/v1")
    /// - `api_key`: bearer token for the Authorization header
    /// - `model`: model identifier (e.g. "gpt-4o-mini")
    ///
    /// # Errors
    ///
    /// `LlmError::Other` when the underlying HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }

    /// Create a client against the default OpenAI endpoint
    pub fn default_endpoint(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, api_key, model)
    }

    /// The model identifier this client sends requests for
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt to the completion endpoint
    ///
    /// # Errors
    ///
    /// - `LlmError::Auth` on HTTP 401/403
    /// - `LlmError::RateLimitExceeded` on HTTP 429
    /// - `LlmError::ModelNotAvailable` on HTTP 404
    /// - `LlmError::Communication` on other HTTP or network failures
    /// - `LlmError::InvalidResponse` when the body cannot be decoded
    pub async fn complete_prompt(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let messages = prompt
            .blocks()
            .iter()
            .map(|block| ChatMessage {
                role: match block.role {
                    Role::Instruction | Role::Context => "system",
                    Role::Task => "user",
                },
                content: block.content.clone(),
            })
            .collect();

        let request_body = ChatRequest {
            model: self.model.clone(),
            messages,
            response_format: insight_response_format(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Auth(format!("HTTP {}: {}", status, body)));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, body)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response carried no content".to_string()))
    }
}

/// JSON-schema response format for the insight payload.
///
/// Field names match the wire payload the pipeline parser expects.
fn insight_response_format() -> serde_json::Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "insight_record",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "general_context": { "type": "string" },
                    "general_relation": { "type": "string" },
                    "quotes": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "text": { "type": "string" },
                                "context": { "type": "string" },
                                "position": { "type": "string" },
                                "relation": { "type": "string" },
                                "issue_reference": { "type": ["string", "null"] }
                            },
                            "required": ["text", "context", "position", "relation", "issue_reference"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["general_context", "general_relation", "quotes"],
                "additionalProperties": false
            }
        }
    })
}

impl CompletionClientTrait for OpenAiClient {
    type Error = LlmError;

    fn complete(&self, prompt: &Prompt) -> Result<String, Self::Error> {
        // Blocking wrapper for the async call; the executor invokes this
        // from a blocking task.
        tokio::runtime::Runtime::new()
            .map_err(|e| LlmError::Other(format!("Runtime error: {}", e)))?
            .block_on(async { self.complete_prompt(prompt).await })
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

    #[test]
    fn test_client_creation() {
        let client = OpenAiClient::new("http://localhost:8080/v1", "key", "gpt-4o-mini").unwrap();
        assert_eq!(client.endpoint, "http://localhost:8080/v1");
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_default_endpoint() {
        let client = OpenAiClient::default_endpoint("key", "gpt-4o-mini").unwrap();
        assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_response_format_shape() {
        let format = insight_response_format();
        assert_eq!(format["type"], "json_schema");
        let schema = &format["json_schema"]["schema"];
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["quotes"].is_object());
    }

    #[test]
    fn test_message_roles() {
        let mut prompt = Prompt::from_instruction("instr");
        prompt.push_context("ctx");
        let prompt = prompt.with_task("task");

        let messages: Vec<&'static str> = prompt
            .blocks()
            .iter()
            .map(|b| match b.role {
                Role::Instruction | Role::Context => "system",
                Role::Task => "user",
            })
            .collect();
        assert_eq!(messages, vec!["system", "system", "user"]);
    }
}

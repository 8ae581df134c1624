//! Parse completion output into insight records

use crate::error::PipelineError;
use marginalia_domain::{InsightRecord, Quote};
use serde::Deserialize;

/// Wire payload for one insight record.
///
/// All fields default so a service that legitimately found nothing can
/// answer with an empty object.
#[derive(Debug, Deserialize)]
struct InsightPayload {
    #[serde(default)]
    general_context: String,
    #[serde(default)]
    general_relation: String,
    #[serde(default)]
    quotes: Vec<QuotePayload>,
}

#[derive(Debug, Deserialize)]
struct QuotePayload {
    #[serde(default)]
    text: String,
    #[serde(default)]
    context: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    relation: String,
    #[serde(default)]
    issue_reference: Option<String>,
}

/// Parse a completion response into an [`InsightRecord`].
///
/// Handles responses wrapped in markdown code fences; anything that does
/// not decode as one insight payload is an [`PipelineError::InvalidFormat`],
/// which the executor treats as terminal rather than retryable.
pub fn parse_insight_response(response: &str) -> Result<InsightRecord, PipelineError> {
    let json_str = strip_fences(response)?;

    let payload: InsightPayload = serde_json::from_str(&json_str)
        .map_err(|e| PipelineError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    Ok(InsightRecord {
        general_context: payload.general_context,
        general_relation: payload.general_relation,
        quotes: payload
            .quotes
            .into_iter()
            .map(|q| Quote {
                text: q.text,
                context: q.context,
                position: q.position,
                relation: q.relation,
                issue_reference: q.issue_reference,
            })
            .collect(),
    })
}

/// Strip a markdown code fence if the response is wrapped in one
fn strip_fences(response: &str) -> Result<String, PipelineError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(PipelineError::InvalidFormat("Empty code block".to_string()));
        }
        // Skip the opening ``` / ```json line and the closing ``` line
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

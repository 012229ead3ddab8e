/// LLM Client — the single point of entry for all generation-service calls
/// in Coverly.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// The model identifier is configuration, not contract: callers pass it per
/// request (see `Config::model` / `Config::fallback_model`). A call is made
/// exactly once — recovery from failure is the composer's explicit fallback
/// policy, never a hidden retry loop here.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Coarse classification of a generation failure. Drives the user-facing
/// hint and the composer's fallback-model eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    InvalidCredential,
    PermissionDenied,
    QuotaExceeded,
    UnknownModel,
    Transient,
    Other,
}

impl LlmErrorKind {
    fn from_status(status: u16) -> Self {
        match status {
            401 => LlmErrorKind::InvalidCredential,
            403 => LlmErrorKind::PermissionDenied,
            404 => LlmErrorKind::UnknownModel,
            429 => LlmErrorKind::QuotaExceeded,
            500..=599 => LlmErrorKind::Transient,
            _ => LlmErrorKind::Other,
        }
    }

    /// Short remediation hint surfaced next to the verbatim provider error.
    pub fn hint(&self) -> &'static str {
        match self {
            LlmErrorKind::InvalidCredential => {
                "Check that ANTHROPIC_API_KEY is set to a valid key."
            }
            LlmErrorKind::PermissionDenied => {
                "The API key does not have access to this model or feature."
            }
            LlmErrorKind::QuotaExceeded => {
                "Rate or usage limit reached. Wait a moment and resubmit."
            }
            LlmErrorKind::UnknownModel => {
                "The configured model identifier was not recognized. Check LETTER_MODEL."
            }
            LlmErrorKind::Transient => "The generation service had a temporary problem. Resubmit.",
            LlmErrorKind::Other => "Correct the input and resubmit.",
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            LlmError::Http(e) if e.is_timeout() || e.is_connect() => LlmErrorKind::Transient,
            LlmError::Http(_) => LlmErrorKind::Other,
            LlmError::Api { status, .. } => LlmErrorKind::from_status(*status),
            LlmError::EmptyContent => LlmErrorKind::Other,
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Seam between the composer and the hosted generation endpoint.
/// Production uses `LlmClient`; tests substitute a recording mock to prove
/// generation is never attempted while required fields are missing.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, model: &str, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// The single LLM client used by Coverly. Wraps the Anthropic Messages API
/// in one blocking (awaited) request per call with a hard request timeout.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes one call to the messages endpoint and returns the full
    /// response object. No retries — an error surfaces to the caller.
    pub async fn call(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Prefer the structured provider message when the body parses
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await.map_err(LlmError::Http)?;

        debug!(
            "LLM call succeeded: model={}, input_tokens={}, output_tokens={}",
            model, llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl GenerationService for LlmClient {
    async fn generate(&self, model: &str, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(model, system, prompt).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification_by_status() {
        let cases = [
            (401, LlmErrorKind::InvalidCredential),
            (403, LlmErrorKind::PermissionDenied),
            (404, LlmErrorKind::UnknownModel),
            (429, LlmErrorKind::QuotaExceeded),
            (500, LlmErrorKind::Transient),
            (529, LlmErrorKind::Transient),
            (400, LlmErrorKind::Other),
        ];
        for (status, expected) in cases {
            let err = LlmError::Api {
                status,
                message: "boom".to_string(),
            };
            assert_eq!(err.kind(), expected, "status {status}");
        }
    }

    #[test]
    fn test_empty_content_is_other() {
        assert_eq!(LlmError::EmptyContent.kind(), LlmErrorKind::Other);
    }

    #[test]
    fn test_every_kind_has_a_hint() {
        let kinds = [
            LlmErrorKind::InvalidCredential,
            LlmErrorKind::PermissionDenied,
            LlmErrorKind::QuotaExceeded,
            LlmErrorKind::UnknownModel,
            LlmErrorKind::Transient,
            LlmErrorKind::Other,
        ];
        for kind in kinds {
            assert!(!kind.hint().is_empty());
        }
    }

    #[test]
    fn test_response_text_takes_first_text_block() {
        let json = r#"{
            "content": [
                {"type": "thinking", "text": null},
                {"type": "text", "text": "Dear Hiring Manager,"},
                {"type": "text", "text": "second block"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 20}
        }"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("Dear Hiring Manager,"));
    }

    #[test]
    fn test_response_text_none_when_no_text_blocks() {
        let json = r#"{
            "content": [],
            "usage": {"input_tokens": 1, "output_tokens": 0}
        }"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_provider_error_body_parses() {
        let body = r#"{"type":"error","error":{"type":"not_found_error","message":"model: no-such-model"}}"#;
        let parsed: AnthropicError = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "model: no-such-model");
    }
}

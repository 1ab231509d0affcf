//! Remote backend: an OpenAI-compatible chat-completions endpoint.
//!
//! Works with OpenAI, OpenRouter, Ollama, vLLM and any other server exposing
//! `/chat/completions`. Every failure is folded into one of the three
//! generation error kinds:
//!
//! | Condition | Error |
//! |-----------|-------|
//! | HTTP 401 / 403, missing key | `InvalidCredentials` |
//! | HTTP 429 | `RateLimited` |
//! | timeout, connection, other status, malformed body | `BackendUnavailable` |

use async_trait::async_trait;
use personachat_core::error::GenerationError;
use personachat_core::message::Message;
use personachat_core::{GenerationBackend, GenerationParams};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// A generation backend talking to a remote provider over HTTP.
pub struct RemoteBackend {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl RemoteBackend {
    /// Create a remote backend. The timeout bounds every request.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::BackendUnavailable(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert our Message types to the chat-completions wire format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect()
    }

    fn request_body(&self, messages: &[Message], params: &GenerationParams) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages: Self::to_api_messages(messages),
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
            stream: false,
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::BackendUnavailable(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            GenerationError::BackendUnavailable(e.to_string())
        }
    }
}

/// Map a non-success HTTP status to a generation error.
///
/// `retry_after` is the raw `Retry-After` header, if the server sent one.
fn status_error(status: u16, body: &str, retry_after: Option<&str>) -> GenerationError {
    match status {
        401 | 403 => GenerationError::InvalidCredentials(
            "Invalid API key or insufficient permissions".into(),
        ),
        429 => GenerationError::RateLimited {
            retry_after_secs: retry_after
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        _ => GenerationError::BackendUnavailable(format!("status {status}: {body}")),
    }
}

#[async_trait]
impl GenerationBackend for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn generate(
        &self,
        messages: Vec<Message>,
        params: GenerationParams,
    ) -> std::result::Result<String, GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::InvalidCredentials(
                "no API key configured for the remote backend".into(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(&messages, &params);

        debug!(model = %self.model, messages = messages.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status().as_u16();
        if status != 200 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Remote backend returned error");
            return Err(status_error(status, &error_body, retry_after.as_deref()));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            GenerationError::BackendUnavailable(format!("Failed to parse response: {e}"))
        })?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::BackendUnavailable("No choices in response".into()))
    }

    async fn health_check(&self) -> std::result::Result<bool, GenerationError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        Ok(response.status().is_success())
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

//! OpenAI-compatible reasoning capability.
//!
//! Works with OpenAI, OpenRouter, Ollama, vLLM, and any endpoint exposing
//! a `/v1/chat/completions` route. The engine only needs text in / text
//! out, so no tool-call or streaming plumbing lives here — the reasoning
//! stage parses the returned text itself.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use fraudhound_core::capability::Reason;
use fraudhound_core::error::CapabilityError;

/// An OpenAI-compatible reasoning client.
pub struct OpenAiCompatReasoner {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiCompatReasoner {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            client,
        }
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[async_trait]
impl Reason for OpenAiCompatReasoner {
    fn name(&self) -> &str {
        "openai_compat"
    }

    async fn reason(&self, prompt: &str) -> Result<String, CapabilityError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.temperature,
            "stream": false,
        });

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending reasoning request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CapabilityError::Timeout(e.to_string())
                } else {
                    CapabilityError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(CapabilityError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(CapabilityError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Reasoning endpoint returned error");
            return Err(CapabilityError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CapabilityError::InvalidResponse("No choices in response".into()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

/// Placeholder used when no API key is configured.
///
/// Every call fails with `NotConfigured`; the engine's fallback reasoning
/// path keeps investigations converging regardless.
pub struct UnconfiguredReasoner;

#[async_trait]
impl Reason for UnconfiguredReasoner {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn reason(&self, _prompt: &str) -> Result<String, CapabilityError> {
        Err(CapabilityError::NotConfigured(
            "no reasoning API key configured".into(),
        ))
    }
}

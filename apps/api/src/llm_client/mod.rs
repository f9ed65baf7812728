/// LLM Client — the single point of entry for all Claude API calls in Tailor.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Agents and the repair step depend on the `TextGenerator` trait; `LlmClient`
/// is its production implementation.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod testing;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in Tailor.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
pub const MAX_RETRIES: u32 = 3;
const HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sampling and delivery settings for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    /// Constrain the reply to machine-readable JSON where the backend supports it.
    pub json_mode: bool,
    /// Transport attempts, including the first. 1 disables retries.
    pub max_attempts: u32,
}

impl GenerateOptions {
    /// Temperature 0, JSON only, single attempt. Used by model repair.
    pub const fn deterministic_json() -> Self {
        Self {
            temperature: 0.0,
            json_mode: true,
            max_attempts: 1,
        }
    }

    /// Settings for an upstream agent stage.
    pub const fn agent(temperature: f32) -> Self {
        Self {
            temperature,
            json_mode: true,
            max_attempts: MAX_RETRIES,
        }
    }
}

/// A text-generation capability: returns a string or fails. Callers must not
/// assume anything about the string beyond that.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
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

/// The single LLM client used by all services in Tailor.
/// Wraps the Anthropic Messages API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, api_key })
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff,
    /// up to `options.max_attempts` attempts in total.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        options: GenerateOptions,
    ) -> Result<LlmResponse, LlmError> {
        let system = if options.json_mode {
            format!("{system}\n\n{JSON_ONLY_SYSTEM}")
        } else {
            system.to_string()
        };

        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: options.temperature,
            system: &system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let max_attempts = options.max_attempts.max(1);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {} bytes of error body", status, body.len());
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse error message
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: max_attempts,
        }))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String, LlmError> {
        let response = self.call(prompt, system, options).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

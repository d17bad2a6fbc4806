/// Anthropic API client (raw HTTP via reqwest)
///
/// API Documentation: https://docs.anthropic.com/en/api/messages
///
/// Endpoints:
/// - POST https://api.anthropic.com/v1/messages
///
/// Models:
/// - "claude-sonnet-4-5-20250929" - Claude Sonnet 4.5 (default)
///
/// Features:
/// - System prompt as a top-level request field, not a message role
/// - x-api-key header authentication plus a pinned anthropic-version header
/// - Long default timeout: scoring responses run to several thousand tokens
pub mod types;

pub use self::types::{
    AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse, AnthropicUsage,
};

use crate::apis::llm::{ LlmError, ModelInvoker };
use crate::logger::{ self, LogTag };
use async_trait::async_trait;
use reqwest::Client;
use std::time::{ Duration, Instant };

// ============================================================================
// API CONFIGURATION
// ============================================================================

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ENDPOINT_MESSAGES: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const DEFAULT_MAX_TOKENS: u32 = 16000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const TIMEOUT_SECS: u64 = 120;

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

/// Anthropic Messages API client
pub struct AnthropicClient {
    api_key: String,
    client: Client,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl AnthropicClient {
    /// Create a new Anthropic client
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key (from https://console.anthropic.com/)
    /// * `model` - Optional model override (defaults to Claude Sonnet 4.5)
    pub fn new(api_key: String, model: Option<String>) -> Result<Self, String> {
        if api_key.trim().is_empty() {
            return Err("Anthropic API key cannot be empty".to_string());
        }

        Ok(Self {
            api_key,
            client: Client::new(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(TIMEOUT_SECS),
        })
    }

    /// Create a client from the application config
    pub fn from_config(config: &crate::config::AnthropicConfig, api_key: String) -> Result<Self, String> {
        let mut client = Self::new(api_key, Some(config.model.clone()))?;
        client.max_tokens = config.max_tokens;
        client.temperature = config.temperature;
        client.timeout = Duration::from_secs(config.request_timeout_secs);
        Ok(client)
    }

    /// Build the Messages API request body
    fn build_request(&self, system_prompt: &str, user_prompt: &str) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            system: Some(system_prompt.to_string()),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: user_prompt.to_string(),
            }],
        }
    }

    /// Pull the completion text out of the response
    fn extract_text(&self, response: AnthropicResponse) -> Result<String, LlmError> {
        let block = response
            .content
            .first()
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: "anthropic".to_string(),
                message: "No content blocks in response".to_string(),
            })?;

        Ok(block.text.clone())
    }

    /// Execute the API call
    async fn execute_request(
        &self,
        request: AnthropicRequest
    ) -> Result<AnthropicResponse, LlmError> {
        let url = format!("{}{}", ANTHROPIC_BASE_URL, ENDPOINT_MESSAGES);

        logger::debug(
            LogTag::Api,
            &format!("[ANTHROPIC] Calling messages API: model={}", request.model)
        );

        let start = Instant::now();
        let response_result = self.client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(self.timeout)
            .send().await;

        let response = response_result.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    provider: "anthropic".to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                LlmError::NetworkError {
                    provider: "anthropic".to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            // Parse retry-after header BEFORE consuming body
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|s| s * 1000); // Convert seconds to ms

            let error_body = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 =>
                    LlmError::AuthError {
                        provider: "anthropic".to_string(),
                        message: "Invalid API key".to_string(),
                    },
                429 =>
                    LlmError::RateLimited {
                        provider: "anthropic".to_string(),
                        retry_after_ms: retry_after,
                    },
                _ =>
                    LlmError::ApiError {
                        provider: "anthropic".to_string(),
                        status_code: status.as_u16(),
                        message: error_body,
                    },
            });
        }

        let anthropic_response = response
            .json::<AnthropicResponse>().await
            .map_err(|e| LlmError::ParseError {
                provider: "anthropic".to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        logger::debug(
            LogTag::Api,
            &format!(
                "[ANTHROPIC] Response in {}ms: {} input tokens, {} output tokens",
                start.elapsed().as_millis(),
                anthropic_response.usage.input_tokens,
                anthropic_response.usage.output_tokens
            )
        );

        Ok(anthropic_response)
    }
}

#[async_trait]
impl ModelInvoker for AnthropicClient {
    async fn invoke(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let request = self.build_request(system_prompt, user_prompt);
        let response = self.execute_request(request).await?;
        self.extract_text(response)
    }
}

// ============================================================================
// TESTS
// ============================================================================

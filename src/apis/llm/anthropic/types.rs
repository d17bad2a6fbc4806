/// Anthropic Messages API request/response types
///
/// These types match the Messages API wire format exactly.
/// API Documentation: https://docs.anthropic.com/en/api/messages
use serde::{ Deserialize, Serialize };

// ============================================================================
// REQUEST TYPES
// ============================================================================

/// Messages API request
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    /// Model ID (e.g., "claude-sonnet-4-5-20250929")
    pub model: String,

    /// Maximum tokens to generate (required by the API)
    pub max_tokens: u32,

    /// Sampling temperature (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// System prompt. Top-level field, not a message role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Conversation messages ("user" / "assistant" roles only)
    pub messages: Vec<AnthropicMessage>,
}

/// Message in Anthropic format
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    /// Role: "user" or "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// Messages API response
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    /// Unique message identifier
    pub id: String,

    /// Model that produced the response
    pub model: String,

    /// Content blocks. Text completions arrive as a single "text" block.
    pub content: Vec<AnthropicContentBlock>,

    /// Why generation stopped ("end_turn", "max_tokens", ...)
    #[serde(default)]
    pub stop_reason: Option<String>,

    /// Token usage statistics
    pub usage: AnthropicUsage,
}

/// A single content block in the response
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicContentBlock {
    /// Block type (always "text" for non-tool responses)
    #[serde(rename = "type")]
    pub block_type: String,

    /// Generated text
    #[serde(default)]
    pub text: String,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct AnthropicUsage {
    /// Tokens in the prompt
    pub input_tokens: u32,

    /// Tokens in the completion
    pub output_tokens: u32,
}

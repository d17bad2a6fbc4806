//! LLM provider clients
//!
//! One provider today (Anthropic), behind the ModelInvoker trait so the
//! scoring pipeline never talks HTTP directly and tests can swap in a
//! canned model.

pub mod anthropic;
pub mod types;

pub use anthropic::AnthropicClient;
pub use types::LlmError;

use async_trait::async_trait;

/// Seam between the scoring pipeline and a concrete model backend.
///
/// Takes the system and user prompt, returns the raw completion text.
/// Implementations own their transport, timeouts and error mapping.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}

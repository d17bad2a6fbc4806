/// Shared LLM API error type
///
/// Provider clients map their transport and HTTP failures onto these
/// variants so callers can react uniformly (retry on rate limits, surface
/// auth problems, and so on).
use serde::{ Deserialize, Serialize };
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LlmError {
    /// Rate limited by provider
    RateLimited {
        provider: String,
        retry_after_ms: Option<u64>,
    },

    /// Request timeout
    Timeout { provider: String, timeout_ms: u64 },

    /// Response arrived but its shape was unusable
    InvalidResponse { provider: String, message: String },

    /// Authentication error
    AuthError { provider: String, message: String },

    /// Network error
    NetworkError { provider: String, message: String },

    /// Response body failed to deserialize
    ParseError { provider: String, message: String },

    /// Generic API error
    ApiError {
        provider: String,
        status_code: u16,
        message: String,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::RateLimited { provider, retry_after_ms } => {
                if let Some(ms) = retry_after_ms {
                    write!(f, "[{}] Rate limited (retry after {}ms)", provider, ms)
                } else {
                    write!(f, "[{}] Rate limited", provider)
                }
            }
            LlmError::Timeout { provider, timeout_ms } => {
                write!(f, "[{}] Request timeout ({}ms)", provider, timeout_ms)
            }
            LlmError::InvalidResponse { provider, message } => {
                write!(f, "[{}] Invalid response: {}", provider, message)
            }
            LlmError::AuthError { provider, message } => {
                write!(f, "[{}] Auth error: {}", provider, message)
            }
            LlmError::NetworkError { provider, message } => {
                write!(f, "[{}] Network error: {}", provider, message)
            }
            LlmError::ParseError { provider, message } => {
                write!(f, "[{}] Parse error: {}", provider, message)
            }
            LlmError::ApiError { provider, status_code, message } => {
                write!(f, "[{}] API error {}: {}", provider, status_code, message)
            }
        }
    }
}

impl std::error::Error for LlmError {}

// Convert to String for compatibility with Result<T, String>
impl From<LlmError> for String {
    fn from(err: LlmError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_provider() {
        let err = LlmError::ApiError {
            provider: "anthropic".to_string(),
            status_code: 500,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "[anthropic] API error 500: overloaded");
    }

    #[test]
    fn test_rate_limit_display_with_retry_hint() {
        let err = LlmError::RateLimited {
            provider: "anthropic".to_string(),
            retry_after_ms: Some(30_000),
        };
        assert!(err.to_string().contains("retry after 30000ms"));
    }
}

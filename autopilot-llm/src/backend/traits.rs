//! Core traits for text-generation backends.
//!
//! The engine only ever needs `prompt in, text out`; this module defines the
//! `TextGenerator` trait that every backend implements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error types for text-generation calls.
///
/// `Clone` so that a single failed call can be handed to every caller
/// waiting on the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Backend is not available
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Rate limited by the backend
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The call did not finish within the configured budget
    #[error("Request timed out after {0}ms")]
    Timeout(u64),
}

/// Core trait for text-generation backends.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend identifier (e.g., model name). Part of every cache key.
    fn id(&self) -> &str;

    /// Generate text for a prompt.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;
}

/// Request for text generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Prompt text, sent verbatim
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0-2.0)
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// Create a request for a prompt with backend defaults.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp.clamp(0.0, 2.0));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_is_clamped() {
        let request = GenerationRequest::new("hi").with_temperature(5.0);
        assert_eq!(request.temperature, Some(2.0));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LlmError::NetworkError("connection reset".into()).to_string(),
            "Network error: connection reset"
        );
        assert_eq!(LlmError::Timeout(250).to_string(), "Request timed out after 250ms");
    }
}

//! Error types for the Gemini API client.

use thiserror::Error;

use crate::retry::Retryable;

/// Errors that can occur when calling the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Client could not be built from configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Gemini API returned an error.
    #[error("API error ({status}): {message}")]
    Api {
        /// Status string from the API, e.g. `INVALID_ARGUMENT`.
        status: String,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API (HTTP 429).
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API key rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The response had no candidate text, e.g. it was blocked by safety filters.
    #[error("empty response (finish reason: {0})")]
    EmptyResponse(String),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

impl Retryable for GeminiError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

/// Error envelope returned by the Gemini API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    /// HTTP status code echoed in the body.
    #[serde(default)]
    pub code: u16,
    pub message: String,
    /// Canonical status, e.g. `RESOURCE_EXHAUSTED`.
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rate_limit_is_retryable() {
        assert!(GeminiError::RateLimited(30).is_retryable());
        assert!(!GeminiError::Unauthorized("bad key".to_string()).is_retryable());
        assert!(
            !GeminiError::Api {
                status: "INTERNAL".to_string(),
                message: "boom".to_string(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_api_error_deserialization() {
        let json = r#"{
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        }"#;

        let response: ApiErrorResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.error.code, 400);
        assert_eq!(response.error.status, "INVALID_ARGUMENT");
        assert!(response.error.message.starts_with("API key not valid"));
    }
}

//! Hosted text generation via the Gemini `generateContent` API.
//!
//! Used by the chat assistant, dashboard insights, the trend endpoint, and
//! content-studio copywriting. Requests are plain JSON over HTTPS with the
//! API key in the `x-goog-api-key` header; rate-limit responses are retried
//! with exponential backoff (see [`crate::retry`]).

mod client;
mod error;
mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use types::{
    Blob, Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part,
};

/// Strip a Markdown code fence the model sometimes wraps JSON in.
///
/// Returns the input trimmed when there is no fence.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (`json`, `JSON`, ...) up to the first newline.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a JSON reply, tolerating a surrounding code fence.
///
/// # Errors
///
/// Returns `GeminiError::Parse` when the text is not valid JSON for `T`.
pub fn parse_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, GeminiError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| GeminiError::Parse(format!("model returned invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1,2]\n```  "), "[1,2]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_json() {
        let value: serde_json::Value = parse_json("```json\n{\"ok\":true}\n```").expect("parse");
        assert_eq!(value["ok"], true);
        assert!(parse_json::<serde_json::Value>("Maaf, saya tidak bisa").is_err());
    }
}

//! Client for the hosted image-generation API.
//!
//! The API takes a multipart form (`image`, `prompt`, `style`) and answers
//! with JSON describing the generated image. The body is passed back to the
//! browser unchanged.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;

use crate::config::ImageGenConfig;
use crate::upload::ImageUpload;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from the image-generation API.
#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),
}

/// Image-generation API client.
#[derive(Clone)]
pub struct ImageGenClient {
    inner: Arc<ImageGenClientInner>,
}

struct ImageGenClientInner {
    client: reqwest::Client,
    url: String,
    api_key: secrecy::SecretString,
}

impl ImageGenClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ImageGenError::Config` if the HTTP client cannot be built.
    pub fn new(config: &ImageGenConfig) -> Result<Self, ImageGenError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ImageGenError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ImageGenClientInner {
                client,
                url: config.url.clone(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Upload the photo with prompt and style, returning the API's JSON.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, non-2xx responses, or a
    /// body that is not JSON.
    #[instrument(skip(self, image), fields(file = %image.file_name, bytes = image.bytes.len()))]
    pub async fn generate(
        &self,
        image: &ImageUpload,
        prompt: &str,
        style: &str,
    ) -> Result<serde_json::Value, ImageGenError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = Form::new()
            .part("image", part)
            .text("prompt", prompt.to_owned())
            .text("style", style.to_owned());

        let response = self
            .inner
            .client
            .post(&self.inner.url)
            .bearer_auth(self.inner.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ImageGenError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ImageGenError::Parse(format!("Failed to parse response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImageGenError::Api {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): overloaded");
    }

    #[test]
    fn test_client_builds() {
        let config = ImageGenConfig {
            url: "https://images.tokoku.id/v1/generate".to_string(),
            api_key: secrecy::SecretString::from("img_9f8Kq2LmZx7Rt4Wv"),
        };
        let client = ImageGenClient::new(&config).expect("client");
        assert_eq!(client.inner.url, "https://images.tokoku.id/v1/generate");
    }
}

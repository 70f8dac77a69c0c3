//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::gemini::{GeminiClient, GeminiError};
use crate::google::GoogleClient;
use crate::imagegen::{ImageGenClient, ImageGenError};
use crate::services::{ChangeHub, ImageBackend, PendingReplies, TrendCache, trend};

/// Error building the outbound API clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Gemini client: {0}")]
    Gemini(#[from] GeminiError),
    #[error("image generation client: {0}")]
    ImageGen(#[from] ImageGenError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    gemini: GeminiClient,
    images: ImageBackend,
    google: Option<GoogleClient>,
    hub: ChangeHub,
    trend_cache: TrendCache,
    pending_replies: PendingReplies,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, StateError> {
        let gemini = GeminiClient::new(&config.gemini)?;
        let images = match &config.image_gen {
            Some(image_config) => ImageBackend::Api(ImageGenClient::new(image_config)?),
            None => ImageBackend::Mock {
                delay: config.studio_mock_delay,
            },
        };
        let google = config.google.as_ref().map(GoogleClient::new);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gemini,
                images,
                google,
                hub: ChangeHub::new(),
                trend_cache: trend::new_cache(),
                pending_replies: PendingReplies::new(),
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Gemini client.
    #[must_use]
    pub fn gemini(&self) -> &GeminiClient {
        &self.inner.gemini
    }

    /// Image backend for the content studio.
    #[must_use]
    pub fn images(&self) -> &ImageBackend {
        &self.inner.images
    }

    /// Google OAuth client, when Google sign-in is configured.
    #[must_use]
    pub fn google(&self) -> Option<&GoogleClient> {
        self.inner.google.as_ref()
    }

    /// Change hub behind the realtime streams.
    #[must_use]
    pub fn hub(&self) -> &ChangeHub {
        &self.inner.hub
    }

    #[must_use]
    pub fn trend_cache(&self) -> &TrendCache {
        &self.inner.trend_cache
    }

    #[must_use]
    pub fn pending_replies(&self) -> &PendingReplies {
        &self.inner.pending_replies
    }
}

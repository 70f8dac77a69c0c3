//! Web server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TOKOKU_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `TOKOKU_BASE_URL` - Public URL of the site, used for cookies and OAuth redirects
//! - `TOKOKU_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `GEMINI_API_KEY` - Hosted text-generation API key
//!
//! ## Optional
//! - `TOKOKU_HOST` - Bind address (default: 127.0.0.1)
//! - `TOKOKU_PORT` - Listen port (default: 3000)
//! - `TOKOKU_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `GEMINI_MODEL` - Model name (default: gemini-2.5-flash)
//! - `GEMINI_API_BASE` - API base URL (default: Google's v1beta endpoint)
//! - `IMAGE_API_URL` / `IMAGE_API_KEY` - Image-generation endpoint; the content
//!   studio runs in mock mode when unset
//! - `STUDIO_MOCK_DELAY_MS` - Mock generation delay (default: 2000)
//! - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` - Enables "Sign in with Google"
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_STUDIO_MOCK_DELAY_MS: u64 = 2_000;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL without trailing slash
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Hosted text-generation API
    pub gemini: GeminiConfig,
    /// Hosted image-generation API; `None` runs the studio in mock mode
    pub image_gen: Option<ImageGenConfig>,
    /// Delay used by the mock studio
    pub studio_mock_delay: Duration,
    /// Google sign-in; `None` hides the button
    pub google: Option<GoogleOAuthConfig>,
    /// JSON log output
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Text-generation API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_base: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Image-generation API configuration.
#[derive(Clone)]
pub struct ImageGenConfig {
    pub url: String,
    pub api_key: SecretString,
}

impl std::fmt::Debug for ImageGenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageGenConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Google OAuth client credentials.
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("TOKOKU_DATABASE_URL")?;
        let host = parse_env("TOKOKU_HOST", "127.0.0.1")?;
        let port = parse_env("TOKOKU_PORT", "3000")?;
        let base_url = normalize_base_url(&get_required_env("TOKOKU_BASE_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("TOKOKU_BASE_URL".to_owned(), e))?;
        let session_secret = get_validated_secret("TOKOKU_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "TOKOKU_SESSION_SECRET")?;

        let gemini = GeminiConfig {
            api_key: get_validated_secret("GEMINI_API_KEY")?,
            model: get_env_or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            api_base: get_env_or_default("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE)
                .trim_end_matches('/')
                .to_owned(),
        };

        let image_gen = match get_optional_pair("IMAGE_API_URL", "IMAGE_API_KEY")? {
            Some((url, _)) => Some(ImageGenConfig {
                url,
                api_key: get_validated_secret("IMAGE_API_KEY")?,
            }),
            None => None,
        };

        let google = match get_optional_pair("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET")? {
            Some((client_id, _)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret: get_validated_secret("GOOGLE_CLIENT_SECRET")?,
            }),
            None => None,
        };

        let studio_mock_delay = Duration::from_millis(parse_env(
            "STUDIO_MOCK_DELAY_MS",
            &DEFAULT_STUDIO_MOCK_DELAY_MS.to_string(),
        )?);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            gemini,
            image_gen,
            studio_mock_delay,
            google,
            log_json: is_truthy(get_optional_env("TOKOKU_LOG_JSON").as_deref()),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default string.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Two variables that must be set together or not at all.
fn get_optional_pair(first: &str, second: &str) -> Result<Option<(String, String)>, ConfigError> {
    match (get_optional_env(first), get_optional_env(second)) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnvVar(second.to_string())),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar(first.to_string())),
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true" | "yes")
    )
}

/// Check the base URL is an absolute http(s) URL and strip any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_owned());
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

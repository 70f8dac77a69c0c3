//! "Sign in with Google" OAuth 2.0 / OpenID Connect client.
//!
//! Flow: redirect to [`GoogleClient::authorization_url`] with a random state
//! and nonce kept in the session, exchange the returned code for tokens,
//! verify the ID token (signature, audience, issuer, nonce), then read the
//! profile from the userinfo endpoint.

use std::sync::Arc;

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::GoogleOAuthConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuer values Google puts in ID tokens.
const ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

/// Errors from the Google OAuth endpoints.
#[derive(Debug, Error)]
pub enum GoogleAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("userinfo request failed: {0}")]
    UserInfo(String),

    #[error("Google account email is not verified")]
    UnverifiedEmail,

    #[error("token response has no ID token")]
    MissingIdToken,

    #[error("invalid ID token: {0}")]
    IdToken(#[from] jsonwebtoken::errors::Error),

    #[error("ID token signed with an unknown key")]
    UnknownSigningKey,

    #[error("ID token nonce does not match the sign-in request")]
    NonceMismatch,

    #[error("ID token subject does not match the profile")]
    SubjectMismatch,
}

/// ID token claims the callback checks.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Tokens returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub struct GoogleTokens {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Profile returned by the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account identifier.
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
}

impl GoogleClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            inner: Arc::new(GoogleClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    /// URL of Google's consent screen.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}&\
            nonce={}&\
            prompt=select_account",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Google rejects the code.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleTokens, GoogleAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.inner.client.post(TOKEN_URL).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::TokenExchange(text));
        }

        Ok(response.json().await?)
    }

    /// Verify an ID token against Google's signing keys and the sign-in nonce.
    ///
    /// # Errors
    ///
    /// Returns an error if the keys cannot be fetched, the signature or a
    /// registered claim is invalid, or the nonce differs.
    #[instrument(skip(self, id_token, nonce))]
    pub async fn verify_id_token(
        &self,
        id_token: &str,
        nonce: &str,
    ) -> Result<IdTokenClaims, GoogleAuthError> {
        let kid = jsonwebtoken::decode_header(id_token)?
            .kid
            .ok_or(GoogleAuthError::UnknownSigningKey)?;

        let keys: JwkSet = self
            .inner
            .client
            .get(JWKS_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let jwk = keys.find(&kid).ok_or(GoogleAuthError::UnknownSigningKey)?;
        let key = DecodingKey::from_jwk(jwk)?;

        check_id_token(id_token, &key, Algorithm::RS256, &self.inner.client_id, nonce)
    }

    /// Fetch the signed-in account's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the email is unverified.
    #[instrument(skip(self, access_token))]
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, GoogleAuthError> {
        let response = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::UserInfo(text));
        }

        let profile: GoogleProfile = response.json().await?;
        if !profile.email_verified {
            return Err(GoogleAuthError::UnverifiedEmail);
        }
        Ok(profile)
    }
}

/// Decode `id_token` with `key` and check audience, issuer, expiry and nonce.
///
/// # Errors
///
/// Returns `GoogleAuthError::IdToken` for a bad signature or registered
/// claim, and `GoogleAuthError::NonceMismatch` when the nonce differs.
pub fn check_id_token(
    id_token: &str,
    key: &DecodingKey,
    algorithm: Algorithm,
    client_id: &str,
    nonce: &str,
) -> Result<IdTokenClaims, GoogleAuthError> {
    let mut validation = Validation::new(algorithm);
    validation.set_audience(&[client_id]);
    validation.set_issuer(&ISSUERS);
    validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);

    let claims = jsonwebtoken::decode::<IdTokenClaims>(id_token, key, &validation)?.claims;
    if claims.nonce.as_deref() != Some(nonce) {
        return Err(GoogleAuthError::NonceMismatch);
    }
    Ok(claims)
}

/// Generate a cryptographically secure random string for OAuth state and nonce.
#[must_use]
pub fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&b| char::from(b))
        .collect()
}

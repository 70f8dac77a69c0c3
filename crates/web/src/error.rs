//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses carry a JSON body `{ "error": "..." }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use tokoku_core::ValidationError;

use crate::db::RepositoryError;
use crate::gemini::GeminiError;
use crate::imagegen::ImageGenError;
use crate::services::{
    AuthError, ChatError, CheckoutError, InventoryError, SalesError, TrendError,
};
use crate::upload::UploadError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Text generation failed.
    #[error("Gemini error: {0}")]
    Gemini(#[from] GeminiError),

    /// Image generation failed.
    #[error("Image generation error: {0}")]
    ImageGen(#[from] ImageGenError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Submitted data failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Uploaded file rejected.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Checkout could not be completed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// A chat reply is already pending for the session.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Validation(e) => Self::Validation(e),
            InventoryError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<SalesError> for AppError {
    fn from(err: SalesError) -> Self {
        match err {
            SalesError::Validation(e) => Self::Validation(e),
            SalesError::Repository(e) => Self::Database(e),
            other @ (SalesError::InvalidRow { .. } | SalesError::TooManyRows) => {
                Self::BadRequest(other.to_string())
            }
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Database(e) => Self::Database(e),
            ChatError::Gemini(e) => Self::Gemini(e),
            ChatError::Validation(e) => Self::Validation(e),
            ChatError::SessionNotFound => Self::NotFound("chat session".to_owned()),
            ChatError::ReplyPending => Self::Conflict(
                "Balasan sebelumnya masih diproses, tunggu sebentar".to_owned(),
            ),
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session store: {err}"))
    }
}

impl From<TrendError> for AppError {
    fn from(err: TrendError) -> Self {
        match err {
            TrendError::Gemini(e) => Self::Gemini(e),
            other @ (TrendError::InvalidMonth | TrendError::InvalidYear) => {
                Self::BadRequest(other.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Gemini(GeminiError::RateLimited(_)) | Self::RateLimited => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::Gemini(_) | Self::ImageGen(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::UserNotFound
                | AuthError::InvalidSessionState => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidName(_) => StatusCode::BAD_REQUEST,
                AuthError::GoogleDisabled => StatusCode::NOT_FOUND,
                AuthError::Google(_) => StatusCode::BAD_GATEWAY,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upload(UploadError::TooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upload(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::InsufficientStock { .. }
                | CheckoutError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
                CheckoutError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to show the client.
    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Data tidak ditemukan".to_owned(),
            Self::Database(RepositoryError::Conflict(_))
            | Self::Checkout(CheckoutError::Repository(RepositoryError::Conflict(_))) => {
                "Data sudah ada atau sedang diubah, muat ulang halaman".to_owned()
            }
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::Gemini(GeminiError::RateLimited(_)) => {
                "Layanan AI sedang sibuk, coba lagi sebentar lagi".to_owned()
            }
            Self::Gemini(_) | Self::ImageGen(_) => "External service error".to_owned(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    "Invalid credentials".to_owned()
                }
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_owned()
                }
                AuthError::WeakPassword(msg) | AuthError::InvalidName(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::InvalidSessionState => "Session expired, please try again".to_owned(),
                AuthError::GoogleDisabled => "Google sign-in is not enabled".to_owned(),
                _ => "Authentication error".to_owned(),
            },
            Self::Validation(err) => err.to_string(),
            Self::Upload(err) => err.to_string(),
            Self::Checkout(CheckoutError::Repository(_)) => "Internal server error".to_owned(),
            Self::Checkout(err) => err.to_string(),
            Self::Conflict(msg)
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg) => msg.clone(),
            Self::RateLimited => "Too many requests".to_owned(),
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
                | Self::Internal(_)
                | Self::Gemini(_)
                | Self::ImageGen(_)
                | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Google(_))
                | Self::Checkout(CheckoutError::Repository(
                    RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
                ))
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server and upstream errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status();
        let body = ErrorBody {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

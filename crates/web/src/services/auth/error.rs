//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::google::GoogleAuthError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tokoku_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Display name missing or too long.
    #[error("invalid display name: {0}")]
    InvalidName(String),

    /// Google sign-in is not configured.
    #[error("Google sign-in is not enabled")]
    GoogleDisabled,

    /// Google rejected the code or returned an unusable profile.
    #[error("Google sign-in failed: {0}")]
    Google(#[from] GoogleAuthError),

    /// Session state missing or invalid.
    #[error("invalid session state")]
    InvalidSessionState,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

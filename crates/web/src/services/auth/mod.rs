//! Authentication service.
//!
//! Provides email/password accounts and "sign in with Google".

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use tokoku_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::google::GoogleProfile;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest display name accepted at sign-up.
const MAX_DISPLAY_NAME_LENGTH: usize = 80;

/// Authentication service.
///
/// Handles user registration, login, and Google account sign-in.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new user with email and password.
    ///
    /// A blank display name falls back to the email's local part.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password, display_name))]
    pub async fn register_with_password(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let display_name = normalize_display_name(display_name, &email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(&email, &display_name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "Registered new account");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    // =========================================================================
    // Google Sign-In
    // =========================================================================

    /// Find or create the account for a verified Google profile.
    ///
    /// Lookup order: linked Google subject, then email (linking the Google
    /// account to the existing user), then a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if Google returned an unusable email.
    /// Returns `AuthError::Repository` if the database operation fails.
    #[instrument(skip(self, profile), fields(sub = %profile.sub))]
    pub async fn sign_in_with_google(&self, profile: &GoogleProfile) -> Result<User, AuthError> {
        if let Some(user) = self.users.get_by_google_sub(&profile.sub).await? {
            return Ok(user);
        }

        let email = Email::parse(&profile.email)?;
        let photo_url = profile.picture.as_deref();

        if let Some(existing) = self.users.get_by_email(&email).await? {
            let user = self
                .users
                .link_google(existing.id, &profile.sub, photo_url)
                .await?;
            tracing::info!(user_id = %user.id, "Linked Google account");
            return Ok(user);
        }

        let display_name =
            normalize_display_name(profile.name.as_deref().unwrap_or_default(), &email)?;
        let user = self
            .users
            .create_with_google(&email, &display_name, photo_url, &profile.sub)
            .await?;
        tracing::info!(user_id = %user.id, "Registered new account via Google");
        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

fn normalize_display_name(name: &str, email: &Email) -> Result<String, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(email.local_part().to_owned());
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(AuthError::InvalidName(format!(
            "name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("rahasia-warung").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("rahasia-warung", &hash).is_ok());
        assert!(matches!(
            verify_password("salah-sandi", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("pendek"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("cukup-panjang").is_ok());
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("apa saja", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_display_name_falls_back_to_local_part() {
        let email = Email::parse("bu.sari@warung.id").expect("email");
        assert_eq!(normalize_display_name("   ", &email).expect("name"), "bu.sari");
        assert_eq!(
            normalize_display_name(" Sari Dewi ", &email).expect("name"),
            "Sari Dewi"
        );
        assert!(normalize_display_name(&"x".repeat(81), &email).is_err());
    }
}

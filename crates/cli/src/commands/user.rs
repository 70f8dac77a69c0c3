//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! tokoku-cli user create -e owner@example.com -n "Warung Bu Sari" -p 'a long password'
//! ```

use thiserror::Error;

use tokoku_web::db;
use tokoku_web::services::{AuthError, AuthService};

use super::{CommandError, database_url};

/// Errors that can occur while creating a user.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create an email/password account.
///
/// A blank name falls back to the email's local part.
///
/// # Errors
///
/// Returns an error for an invalid email, a weak password, an email that is
/// already registered, or a database failure.
pub async fn create(email: &str, name: &str, password: &str) -> Result<(), UserError> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let user = AuthService::new(&pool)
        .register_with_password(email, name, password)
        .await?;

    tracing::info!(
        "User created! ID: {}, Email: {}, Name: {}",
        user.id,
        user.email,
        user.display_name
    );
    Ok(())
}

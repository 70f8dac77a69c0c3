//! Database operations for Tokoku `PostgreSQL`.
//!
//! # Schema: `tokoku`
//!
//! ## Tables
//!
//! - `user` - Accounts (email/password or Google)
//! - `user_password` - Argon2 password hashes
//! - `product` - Inventory, one row per product
//! - `transaction` - Recorded sales with JSONB line items
//! - `chat_session` / `chat_message` - Assistant conversations
//!
//! Sessions live in `tower_sessions.session`.
//!
//! Every query is scoped by `user_id`; a row owned by another user behaves
//! as if it did not exist.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p tokoku-cli -- migrate
//! ```

pub mod chat;
pub mod products;
pub mod transactions;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use chat::ChatRepository;
pub use products::ProductRepository;
pub use transactions::TransactionRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Parse a `TEXT` enum column.
pub(crate) fn parse_column<T>(value: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| RepositoryError::DataCorruption(e.to_string()))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use tokoku_core::TransactionStatus;

    use super::*;

    #[test]
    fn test_parse_column() {
        let status: TransactionStatus = parse_column("pending").expect("parse");
        assert_eq!(status, TransactionStatus::Pending);

        let err = parse_column::<TransactionStatus>("refunded").expect_err("invalid");
        assert!(matches!(err, RepositoryError::DataCorruption(msg) if msg.contains("refunded")));
    }

    #[test]
    fn test_conflict_passthrough_for_other_errors() {
        let err = conflict_on_unique(sqlx::Error::RowNotFound, "email");
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}

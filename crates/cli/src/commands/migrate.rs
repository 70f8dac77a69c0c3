//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! tokoku-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `TOKOKU_DATABASE_URL` - `PostgreSQL` connection string (or `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/web/migrations/` and are embedded at build time.

use thiserror::Error;

use tokoku_web::db;

use super::{CommandError, database_url};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tokoku_core::{Email, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::User;

const USER_COLUMNS: &str = "id, email, display_name, photo_url, google_sub, created_at, updated_at";

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    display_name: String,
    photo_url: Option<String>,
    google_sub: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            display_name: row.display_name,
            photo_url: row.photo_url,
            google_sub: row.google_sub,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row for the password lookup join.
#[derive(Debug, sqlx::FromRow)]
struct UserPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM tokoku.user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM tokoku.user WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their linked Google account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_google_sub(&self, sub: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM tokoku.user WHERE google_sub = $1"
        ))
        .bind(sub)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        display_name: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO tokoku.user (email, display_name) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(display_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        sqlx::query("INSERT INTO tokoku.user_password (user_id, password_hash) VALUES ($1, $2)")
            .bind(row.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Create a user from a Google profile. No password is stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or Google account is taken.
    pub async fn create_with_google(
        &self,
        email: &Email,
        display_name: &str,
        photo_url: Option<&str>,
        google_sub: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO tokoku.user (email, display_name, photo_url, google_sub)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(email.as_str())
        .bind(display_name)
        .bind(photo_url)
        .bind(google_sub)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "account"))?;

        row.try_into()
    }

    /// Link a Google account to an existing user and refresh the avatar.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the Google account is linked elsewhere.
    pub async fn link_google(
        &self,
        id: UserId,
        google_sub: &str,
        photo_url: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE tokoku.user
            SET google_sub = $2, photo_url = COALESCE($3, photo_url)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(google_sub)
        .bind(photo_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Google account"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserPasswordRow>(
            r"
            SELECT u.id, u.email, u.display_name, u.photo_url, u.google_sub,
                   u.created_at, u.updated_at, p.password_hash
            FROM tokoku.user u
            LEFT JOIN tokoku.user_password p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let Some(password_hash) = r.password_hash else {
            return Ok(None);
        };

        Ok(Some((r.user.try_into()?, password_hash)))
    }
}

//! Database operations for chat sessions and messages.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tokoku_core::{ChatMessage, ChatMessageId, ChatRole, ChatSession, ChatSessionId, UserId};

use super::{RepositoryError, parse_column};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` chat session queries.
#[derive(Debug, sqlx::FromRow)]
struct ChatSessionRow {
    id: i32,
    user_id: i32,
    title: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ChatSessionRow> for ChatSession {
    fn from(row: ChatSessionRow) -> Self {
        Self {
            id: ChatSessionId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for `PostgreSQL` chat message queries.
#[derive(Debug, sqlx::FromRow)]
struct ChatMessageRow {
    id: i32,
    chat_session_id: i32,
    role: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChatMessageRow> for ChatMessage {
    type Error = RepositoryError;

    fn try_from(row: ChatMessageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ChatMessageId::new(row.id),
            session_id: ChatSessionId::new(row.chat_session_id),
            role: parse_column(&row.role)?,
            text: row.text,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for chat database operations.
pub struct ChatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatRepository<'a> {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new chat session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_session(&self, user_id: UserId) -> Result<ChatSession, RepositoryError> {
        let row = sqlx::query_as::<_, ChatSessionRow>(
            r"
            INSERT INTO tokoku.chat_session (user_id)
            VALUES ($1)
            RETURNING id, user_id, title, created_at, updated_at
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a chat session owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_session(
        &self,
        user_id: UserId,
        id: ChatSessionId,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query_as::<_, ChatSessionRow>(
            r"
            SELECT id, user_id, title, created_at, updated_at
            FROM tokoku.chat_session
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List chat sessions for a user, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_sessions(&self, user_id: UserId) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows = sqlx::query_as::<_, ChatSessionRow>(
            r"
            SELECT id, user_id, title, created_at, updated_at
            FROM tokoku.chat_session
            WHERE user_id = $1
            ORDER BY updated_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Set a session's title unless it already has one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_title_if_empty(
        &self,
        id: ChatSessionId,
        title: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE tokoku.chat_session SET title = $2 WHERE id = $1 AND title IS NULL")
            .bind(id)
            .bind(title)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Append a message and bump the session's `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_message(
        &self,
        session_id: ChatSessionId,
        role: ChatRole,
        text: &str,
    ) -> Result<ChatMessage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ChatMessageRow>(
            r"
            INSERT INTO tokoku.chat_message (chat_session_id, role, text)
            VALUES ($1, $2, $3)
            RETURNING id, chat_session_id, role, text, created_at
            ",
        )
        .bind(session_id)
        .bind(role.as_str())
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE tokoku.chat_session SET updated_at = NOW() WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// All messages in a session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_messages(
        &self,
        session_id: ChatSessionId,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ChatMessageRow>(
            r"
            SELECT id, chat_session_id, role, text, created_at
            FROM tokoku.chat_message
            WHERE chat_session_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(session_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

//! Chat service for the AI business assistant.
//!
//! Sending a message:
//! 1. Save the user message (the first one also titles the session)
//! 2. Build the request from the stored history plus the new text
//! 3. Call Gemini
//! 4. Save the model reply
//!
//! Only one reply per session may be in flight; a second send while one is
//! pending is rejected with [`ChatError::ReplyPending`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use askama::Template;
use futures::Stream;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument};

use tokoku_core::{ChatMessage, ChatRole, ChatSession, ChatSessionId, UserId, ValidationError, chat};

use crate::db::{ChatRepository, RepositoryError};
use crate::gemini::{Content, GeminiClient, GeminiError, GenerateContentRequest};

use super::realtime::{ChangeHub, Collection, watch};

/// System prompt for the chat assistant.
#[derive(Template)]
#[template(path = "prompts/chat_system.txt")]
struct SystemPromptTemplate<'a> {
    display_name: &'a str,
}

/// Render the system prompt template.
fn render_system_prompt(display_name: &str) -> String {
    SystemPromptTemplate { display_name }
        .render()
        .unwrap_or_else(|_| String::from("Kamu adalah asisten bisnis untuk UMKM Indonesia."))
}

/// Errors that can occur in the chat service.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Gemini API error.
    #[error("Gemini API error: {0}")]
    Gemini(#[from] GeminiError),

    /// Blank or oversized message.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Session not found (or owned by someone else).
    #[error("session not found")]
    SessionNotFound,

    /// A reply for this session is still being generated.
    #[error("a reply is already being generated for this session")]
    ReplyPending,
}

/// Sessions with a reply in flight.
#[derive(Clone, Default)]
pub struct PendingReplies {
    sessions: Arc<Mutex<HashSet<ChatSessionId>>>,
}

impl PendingReplies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `session_id` busy until the returned guard is dropped.
    ///
    /// Returns `None` if it is already busy.
    #[must_use]
    pub fn try_begin(&self, session_id: ChatSessionId) -> Option<PendingGuard> {
        let inserted = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id);
        inserted.then(|| PendingGuard {
            sessions: Arc::clone(&self.sessions),
            session_id,
        })
    }

    /// Whether a reply is pending for `session_id`.
    #[must_use]
    pub fn is_pending(&self, session_id: ChatSessionId) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&session_id)
    }
}

/// Clears the pending flag on drop, including on error and cancellation.
pub struct PendingGuard {
    sessions: Arc<Mutex<HashSet<ChatSessionId>>>,
    session_id: ChatSessionId,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.session_id);
    }
}

/// A session with its messages, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct SessionWithMessages {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

/// The user message and the reply written by one send.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub user: ChatMessage,
    pub reply: ChatMessage,
}

/// Chat service.
pub struct ChatService<'a> {
    pool: &'a PgPool,
    gemini: &'a GeminiClient,
    hub: &'a ChangeHub,
    pending: &'a PendingReplies,
}

impl<'a> ChatService<'a> {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        gemini: &'a GeminiClient,
        hub: &'a ChangeHub,
        pending: &'a PendingReplies,
    ) -> Self {
        Self {
            pool,
            gemini,
            hub,
            pending,
        }
    }

    /// Create a new, untitled session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_session(&self, user_id: UserId) -> Result<ChatSession, ChatError> {
        let session = ChatRepository::new(self.pool).create_session(user_id).await?;
        self.hub.publish(user_id, Collection::ChatSessions);
        Ok(session)
    }

    /// The user's sessions, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_sessions(&self, user_id: UserId) -> Result<Vec<ChatSession>, ChatError> {
        Ok(list_sessions_sorted(self.pool, user_id).await?)
    }

    /// A session and its messages.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::SessionNotFound` if the user has no such session.
    pub async fn get_session(
        &self,
        user_id: UserId,
        session_id: ChatSessionId,
    ) -> Result<SessionWithMessages, ChatError> {
        let repo = ChatRepository::new(self.pool);
        let session = repo
            .get_session(user_id, session_id)
            .await?
            .ok_or(ChatError::SessionNotFound)?;
        let messages = messages_sorted(self.pool, session_id).await?;
        Ok(SessionWithMessages { session, messages })
    }

    /// Whether a reply is being generated for the session.
    #[must_use]
    pub fn is_pending(&self, session_id: ChatSessionId) -> bool {
        self.pending.is_pending(session_id)
    }

    /// Send a message and wait for the assistant's reply.
    ///
    /// If Gemini fails the user message stays saved and the error is
    /// returned; the user can send again.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::ReplyPending` if a reply is already in flight,
    /// `ChatError::Validation` for a blank message, or the Gemini error.
    #[instrument(skip(self, text, display_name), fields(user_id = %user_id, session_id = %session_id))]
    pub async fn send_message(
        &self,
        user_id: UserId,
        session_id: ChatSessionId,
        display_name: &str,
        text: &str,
    ) -> Result<Exchange, ChatError> {
        let text = chat::validate_message(text)?;
        let repo = ChatRepository::new(self.pool);

        let session = repo
            .get_session(user_id, session_id)
            .await?
            .ok_or(ChatError::SessionNotFound)?;

        let _guard = self
            .pending
            .try_begin(session_id)
            .ok_or(ChatError::ReplyPending)?;

        let history = messages_sorted(self.pool, session_id).await?;

        let user = repo.add_message(session_id, ChatRole::User, &text).await?;
        if session.title.is_none() {
            repo.set_title_if_empty(session_id, &chat::generate_title(&text))
                .await?;
        }
        publish_session_change(self.hub, user_id, session_id);

        let request = GenerateContentRequest::new(build_contents(&history, &text))
            .with_system(render_system_prompt(display_name));
        let reply_text = self.gemini.generate_text(&request).await?;

        info!(reply_chars = reply_text.chars().count(), "Gemini reply received");

        let reply = repo
            .add_message(session_id, ChatRole::Model, &reply_text)
            .await?;
        publish_session_change(self.hub, user_id, session_id);

        Ok(Exchange { user, reply })
    }

    /// Snapshot stream of a session's messages.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::SessionNotFound` if the user has no such session.
    pub async fn subscribe_messages(
        &self,
        user_id: UserId,
        session_id: ChatSessionId,
    ) -> Result<impl Stream<Item = Result<Vec<ChatMessage>, RepositoryError>> + use<>, ChatError>
    {
        ChatRepository::new(self.pool)
            .get_session(user_id, session_id)
            .await?
            .ok_or(ChatError::SessionNotFound)?;

        let pool = self.pool.clone();
        Ok(watch(
            self.hub,
            user_id,
            Collection::ChatMessages(session_id),
            move || {
                let pool = pool.clone();
                async move { messages_sorted(&pool, session_id).await }
            },
        ))
    }

    /// Snapshot stream of the user's session list.
    pub fn subscribe_sessions(
        &self,
        user_id: UserId,
    ) -> impl Stream<Item = Result<Vec<ChatSession>, RepositoryError>> + use<> {
        let pool = self.pool.clone();
        watch(self.hub, user_id, Collection::ChatSessions, move || {
            let pool = pool.clone();
            async move { list_sessions_sorted(&pool, user_id).await }
        })
    }
}

/// A new message reorders the session list as well as the transcript.
fn publish_session_change(hub: &ChangeHub, user_id: UserId, session_id: ChatSessionId) {
    hub.publish(user_id, Collection::ChatMessages(session_id));
    hub.publish(user_id, Collection::ChatSessions);
}

/// Request contents: the stored history in order, then the pending text.
#[must_use]
pub fn build_contents(history: &[ChatMessage], pending: &str) -> Vec<Content> {
    history
        .iter()
        .map(|message| Content::text(message.role, &message.text))
        .chain(std::iter::once(Content::text(ChatRole::User, pending)))
        .collect()
}

async fn messages_sorted(
    pool: &PgPool,
    session_id: ChatSessionId,
) -> Result<Vec<ChatMessage>, RepositoryError> {
    let mut messages = ChatRepository::new(pool).get_messages(session_id).await?;
    chat::sort_oldest_first(&mut messages);
    Ok(messages)
}

async fn list_sessions_sorted(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<ChatSession>, RepositoryError> {
    let mut sessions = ChatRepository::new(pool).list_sessions(user_id).await?;
    chat::sort_recent_first(&mut sessions);
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tokoku_core::ChatMessageId;

    use super::*;

    fn message(id: i32, role: ChatRole, text: &str) -> ChatMessage {
        ChatMessage {
            id: ChatMessageId::new(id),
            session_id: ChatSessionId::new(7),
            role,
            text: text.to_string(),
            created_at: Utc::now() + Duration::seconds(i64::from(id)),
        }
    }

    #[test]
    fn test_build_contents_appends_pending() {
        let history = vec![
            message(1, ChatRole::User, "Halo"),
            message(2, ChatRole::Model, "Halo! Ada yang bisa dibantu?"),
        ];
        let contents = build_contents(&history, "Ide promo akhir pekan?");

        let roles: Vec<_> = contents.iter().map(|c| c.role.as_deref()).collect();
        assert_eq!(roles, vec![Some("user"), Some("model"), Some("user")]);
        let texts: Vec<_> = contents.iter().map(Content::joined_text).collect();
        assert_eq!(
            texts,
            vec!["Halo", "Halo! Ada yang bisa dibantu?", "Ide promo akhir pekan?"]
        );
    }

    #[tokio::test]
    async fn test_message_change_refreshes_session_list() {
        use std::pin::pin;
        use std::time::Duration as StdDuration;

        use futures::StreamExt;

        let hub = ChangeHub::new();
        let user = UserId::new(1);
        let mut sessions = pin!(watch(&hub, user, Collection::ChatSessions, || {
            std::future::ready(Ok::<_, RepositoryError>(()))
        }));
        let first = tokio::time::timeout(StdDuration::from_millis(200), sessions.next()).await;
        assert!(matches!(first, Ok(Some(Ok(())))));

        publish_session_change(&hub, user, ChatSessionId::new(3));
        let refreshed = tokio::time::timeout(StdDuration::from_millis(200), sessions.next()).await;
        assert!(matches!(refreshed, Ok(Some(Ok(())))));
    }

    #[test]
    fn test_build_contents_empty_history() {
        let contents = build_contents(&[], "Mulai");
        assert_eq!(contents.len(), 1);
    }

    #[test]
    fn test_pending_guard_releases_on_drop() {
        let pending = PendingReplies::new();
        let id = ChatSessionId::new(3);

        let guard = pending.try_begin(id).expect("first send");
        assert!(pending.is_pending(id));
        assert!(pending.try_begin(id).is_none());
        assert!(pending.try_begin(ChatSessionId::new(4)).is_some());

        drop(guard);
        assert!(!pending.is_pending(id));
        assert!(pending.try_begin(id).is_some());
    }

    #[test]
    fn test_system_prompt_mentions_user() {
        let prompt = render_system_prompt("Bu Sari");
        assert!(prompt.contains("Bu Sari"));
    }
}

//! Chat assistant page.
//!
//! Renders the session list and the selected conversation. Sending and live
//! updates go through `/api/chat/*` from `static/js/chat.js`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use tokoku_core::{ChatMessage, ChatRole, ChatSession, ChatSessionId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::services::{ChatError, ChatService};
use crate::state::AppState;

/// Query parameters for the chat page.
#[derive(Debug, Deserialize)]
pub struct ChatPageQuery {
    pub session: Option<i32>,
}

/// Session list entry.
pub struct SessionView {
    pub id: i32,
    pub title: String,
    pub updated: String,
}

impl From<&ChatSession> for SessionView {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id.as_i32(),
            title: session.display_title().to_owned(),
            updated: filters::format_datetime(&session.updated_at),
        }
    }
}

/// One chat bubble.
pub struct MessageView {
    pub from_user: bool,
    pub text: String,
    pub time: String,
}

impl From<&ChatMessage> for MessageView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            from_user: message.role == ChatRole::User,
            text: message.text.clone(),
            time: message.created_at.format("%H:%M").to_string(),
        }
    }
}

/// The open conversation.
pub struct ConversationView {
    pub id: i32,
    pub title: String,
    pub messages: Vec<MessageView>,
    pub pending: bool,
}

/// Chat page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/chat.html")]
pub struct ChatTemplate {
    pub user: CurrentUser,
    pub active: &'static str,
    pub sessions: Vec<SessionView>,
    pub current: Option<ConversationView>,
}

/// Render the chat page. Without `?session=` the most recent session opens.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ChatPageQuery>,
) -> Result<Response> {
    let service = ChatService::new(
        state.pool(),
        state.gemini(),
        state.hub(),
        state.pending_replies(),
    );

    let sessions = service.list_sessions(user.id).await?;

    let selected = query
        .session
        .map(ChatSessionId::new)
        .or_else(|| sessions.first().map(|s| s.id));

    let current = match selected {
        Some(session_id) => match service.get_session(user.id, session_id).await {
            Ok(found) => Some(ConversationView {
                id: found.session.id.as_i32(),
                title: found.session.display_title().to_owned(),
                messages: found.messages.iter().map(MessageView::from).collect(),
                pending: service.is_pending(session_id),
            }),
            Err(ChatError::SessionNotFound) => {
                return Ok(Redirect::to("/chat").into_response());
            }
            Err(e) => return Err(AppError::from(e)),
        },
        None => None,
    };

    Ok(ChatTemplate {
        active: "chat",
        sessions: sessions.iter().map(SessionView::from).collect(),
        current,
        user,
    }
    .into_response())
}

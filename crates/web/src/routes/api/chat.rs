//! Chat assistant API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tokoku_core::{ChatMessage, ChatSession, ChatSessionId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::ChatService;
use crate::services::chat::Exchange;
use crate::state::AppState;

use super::snapshot_sse;

/// Request to send a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// A session with its messages.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
    /// A reply is being generated; sending is disabled until it lands.
    pub pending: bool,
}

fn service(state: &AppState) -> ChatService<'_> {
    ChatService::new(
        state.pool(),
        state.gemini(),
        state.hub(),
        state.pending_replies(),
    )
}

/// `GET /api/chat/sessions`: most recently active first.
pub async fn list_sessions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<ChatSession>>> {
    Ok(Json(service(&state).list_sessions(user.id).await?))
}

/// `POST /api/chat/sessions`
pub async fn create_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<ChatSession>)> {
    let session = service(&state).create_session(user.id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /api/chat/sessions/{id}`
pub async fn get_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<SessionResponse>> {
    let session_id = ChatSessionId::new(id);
    let chat = service(&state);
    let found = chat.get_session(user.id, session_id).await?;

    Ok(Json(SessionResponse {
        session: found.session,
        messages: found.messages,
        pending: chat.is_pending(session_id),
    }))
}

/// `POST /api/chat/sessions/{id}/messages`
///
/// Waits for the reply. Answers 409 while another reply for the session
/// is pending.
#[instrument(skip(state, user, request), fields(user_id = %user.id, session_id = id))]
pub async fn send_message(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Exchange>> {
    let exchange = service(&state)
        .send_message(
            user.id,
            ChatSessionId::new(id),
            &user.display_name,
            &request.text,
        )
        .await?;

    Ok(Json(exchange))
}

/// `GET /api/chat/sessions/stream`: the session list, most recent first.
pub async fn stream_sessions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    snapshot_sse(service(&state).subscribe_sessions(user.id))
}

/// `GET /api/chat/sessions/{id}/stream`: messages, oldest first.
pub async fn stream(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let messages = service(&state)
        .subscribe_messages(user.id, ChatSessionId::new(id))
        .await?;

    Ok(snapshot_sse(messages))
}

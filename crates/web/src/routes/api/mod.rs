//! JSON API used by the dashboard scripts.
//!
//! Every route requires a signed-in user and answers errors as
//! `{ "error": "..." }` (see [`crate::error::AppError`]). Collection streams
//! are Server-Sent Events carrying a full, sorted `snapshot` event on
//! connect and after every change.

pub mod cart;
pub mod chat;
pub mod dashboard;
pub mod inventory;
pub mod me;
pub mod sales;
pub mod studio;
pub mod trend;

use std::convert::Infallible;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post, put},
};
use futures::{Stream, StreamExt};
use serde::Serialize;

use crate::db::RepositoryError;
use crate::state::AppState;
use crate::upload::MAX_FILE_SIZE;

/// Room for the text fields and multipart framing around the photo.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the inventory API router.
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::list).post(inventory::create))
        .route("/{id}", put(inventory::update).delete(inventory::delete))
        .route("/stream", get(inventory::stream))
}

/// Create the sales API router.
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sales::list).post(sales::create))
        .route("/import", post(sales::import))
        .route("/stream", get(sales::stream))
}

/// Create the cart API router.
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{product_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/checkout", post(cart::checkout))
}

/// Create the chat API router.
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(chat::list_sessions).post(chat::create_session))
        .route("/sessions/stream", get(chat::stream_sessions))
        .route("/sessions/{id}", get(chat::get_session))
        .route("/sessions/{id}/messages", post(chat::send_message))
        .route("/sessions/{id}/stream", get(chat::stream))
}

/// Routes that accept a photo upload.
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/studio/generate", post(studio::generate))
        .route("/design", post(studio::design))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + MULTIPART_OVERHEAD))
}

/// Create all API routes (mounted at `/api`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me::show))
        .route("/dashboard/insights", get(dashboard::insights))
        .route("/trend", get(trend::show))
        .nest("/inventory", inventory_routes())
        .nest("/sales", sales_routes())
        .nest("/cart", cart_routes())
        .nest("/chat", chat_routes())
        .merge(upload_routes())
}

/// Forward a snapshot stream as SSE.
///
/// Each snapshot becomes a `snapshot` event with a JSON array body. A failed
/// fetch becomes one `error` event, after which the stream ends and the
/// browser's `EventSource` reconnects.
pub fn snapshot_sse<T, S>(snapshots: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Serialize,
    S: Stream<Item = Result<T, RepositoryError>> + Send + 'static,
{
    let events = snapshots.map(|snapshot| {
        let event = match snapshot {
            Ok(items) => Event::default()
                .event("snapshot")
                .json_data(&items)
                .unwrap_or_else(|e| {
                    tracing::error!(error = %e, "Failed to serialize snapshot");
                    error_event()
                }),
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot fetch failed");
                error_event()
            }
        };
        Ok(event)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn error_event() -> Event {
    Event::default()
        .event("error")
        .data(r#"{"error":"Gagal memuat data terbaru"}"#)
}

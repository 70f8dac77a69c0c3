//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (rate limited)
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action (rate limited)
//! POST /auth/logout            - Logout action
//! GET  /auth/google/login      - Redirect to Google consent screen
//! GET  /auth/google/callback   - Handle OAuth callback (rate limited)
//!
//! # Dashboard (requires auth, redirects to login)
//! GET  /dashboard              - Overview
//! GET  /inventory              - Inventory table (?q=&category=)
//! GET  /transaction            - Point-of-sale screen
//! GET  /sales                  - Sales history (?status=&q=)
//! GET  /chat                   - Assistant (?session=)
//! GET  /studio                 - Content studio
//!
//! # JSON API (requires auth, answers 401)
//! GET  /api/me
//! GET  /api/dashboard/insights
//! GET|POST /api/inventory, PUT|DELETE /api/inventory/{id}, GET /api/inventory/stream
//! GET|POST /api/sales, POST /api/sales/import, GET /api/sales/stream
//! GET|DELETE /api/cart, POST /api/cart/items, PUT|DELETE /api/cart/items/{product_id}
//! POST /api/cart/checkout
//! GET|POST /api/chat/sessions, GET /api/chat/sessions/{id}, GET /api/chat/sessions/stream
//! POST /api/chat/sessions/{id}/messages, GET /api/chat/sessions/{id}/stream
//! POST /api/studio/generate, POST /api/design, GET /api/trend
//! ```

pub mod api;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod google_auth;
pub mod home;
pub mod inventory;
pub mod pos;
pub mod sales;
pub mod studio;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
        .route("/google/login", get(google_auth::login))
        .route(
            "/google/callback",
            get(google_auth::callback).layer(auth_rate_limiter()),
        )
}

/// Create the dashboard page routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::index))
        .route("/inventory", get(inventory::index))
        .route("/transaction", get(pos::index))
        .route("/sales", get(sales::index))
        .route("/chat", get(chat::index))
        .route("/studio", get(studio::index))
}

/// Create all routes for the web app.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/auth", auth_routes())
        .merge(dashboard_routes())
        .nest("/api", api::routes())
}

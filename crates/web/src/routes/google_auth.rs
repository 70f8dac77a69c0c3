//! "Sign in with Google" route handlers.
//!
//! - Login: store a random state and nonce in the session, redirect to Google
//! - Callback: check the state, exchange the code, verify the ID token
//!   against the stored nonce, read the profile, and sign the matching (or
//!   newly created) account in

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::google::{GoogleAuthError, generate_random_string};
use crate::models::session_keys;
use crate::routes::auth::start_session;
use crate::services::AuthService;
use crate::state::AppState;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if the user declined or Google failed.
    pub error: Option<String>,
}

fn redirect_uri(state: &AppState) -> String {
    format!("{}/auth/google/callback", state.config().base_url)
}

/// Initiate Google sign-in.
///
/// # Route
///
/// `GET /auth/google/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let Some(google) = state.google() else {
        return Redirect::to("/auth/login?error=google_disabled").into_response();
    };

    let oauth_state = generate_random_string(32);
    let nonce = generate_random_string(32);

    if let Err(e) = session
        .insert(session_keys::GOOGLE_OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    if let Err(e) = session
        .insert(session_keys::GOOGLE_OAUTH_NONCE, &nonce)
        .await
    {
        tracing::error!("Failed to store OAuth nonce in session: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    let auth_url = google.authorization_url(&redirect_uri(&state), &oauth_state, &nonce);

    Redirect::to(&auth_url).into_response()
}

/// Handle the Google OAuth callback.
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(google) = state.google() else {
        return Redirect::to("/auth/login?error=google_disabled").into_response();
    };

    if let Some(error) = query.error {
        tracing::warn!("Google OAuth error: {}", error);
        return Redirect::to("/auth/login?error=google_denied").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("Google OAuth callback missing code");
        return Redirect::to("/auth/login?error=google_failed").into_response();
    };

    let stored_state: Option<String> = session
        .remove(session_keys::GOOGLE_OAUTH_STATE)
        .await
        .ok()
        .flatten();
    let stored_nonce: Option<String> = session
        .remove(session_keys::GOOGLE_OAUTH_NONCE)
        .await
        .ok()
        .flatten();

    if query.state.is_none() || stored_state != query.state {
        tracing::warn!("Google OAuth state mismatch");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    }

    let Some(nonce) = stored_nonce else {
        tracing::warn!("Google OAuth nonce missing from session");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    };

    let tokens = match google.exchange_code(&code, &redirect_uri(&state)).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!("Failed to exchange Google OAuth code: {}", e);
            return Redirect::to("/auth/login?error=google_failed").into_response();
        }
    };

    let claims = match tokens.id_token.as_deref() {
        Some(token) => google.verify_id_token(token, &nonce).await,
        None => Err(GoogleAuthError::MissingIdToken),
    };
    let claims = match claims {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Rejected Google ID token: {}", e);
            return Redirect::to("/auth/login?error=google_failed").into_response();
        }
    };

    let profile = match google.fetch_profile(&tokens.access_token).await {
        Ok(profile) if profile.sub == claims.sub => profile,
        Ok(_) => {
            tracing::warn!("Google OAuth: {}", GoogleAuthError::SubjectMismatch);
            return Redirect::to("/auth/login?error=google_failed").into_response();
        }
        Err(e) => {
            tracing::warn!("Failed to fetch Google profile: {}", e);
            return Redirect::to("/auth/login?error=google_failed").into_response();
        }
    };

    match AuthService::new(state.pool())
        .sign_in_with_google(&profile)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Google sign-in succeeded");
            start_session(&session, &user).await
        }
        Err(e) => {
            tracing::error!("Google sign-in failed: {}", e);
            Redirect::to("/auth/login?error=google_failed").into_response()
        }
    }
}

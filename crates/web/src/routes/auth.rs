//! Email/password authentication route handlers.
//!
//! Form posts redirect back to the form with an `?error=` code on failure;
//! the code is translated to a message when the page renders.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    pub google_enabled: bool,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<&'static str>,
    pub google_enabled: bool,
}

/// Message shown for an `?error=` code; unknown codes show nothing.
#[must_use]
pub fn error_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "credentials" => "Email atau kata sandi salah.",
        "invalid_email" => "Format email tidak valid.",
        "exists" => "Email ini sudah terdaftar. Silakan masuk.",
        "weak_password" => "Kata sandi minimal 8 karakter.",
        "password_mismatch" => "Konfirmasi kata sandi tidak cocok.",
        "invalid_name" => "Nama terlalu panjang.",
        "google_disabled" => "Masuk dengan Google belum diaktifkan.",
        "google_denied" => "Masuk dengan Google dibatalkan.",
        "google_failed" => "Gagal masuk dengan Google. Coba lagi.",
        "invalid_state" => "Sesi login kedaluwarsa. Coba lagi.",
        "session" | "server" => "Terjadi kesalahan. Coba lagi sebentar lagi.",
        _ => return None,
    };
    Some(message)
}

/// Error code for a failed sign-in or sign-up.
const fn error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidCredentials | AuthError::UserNotFound => "credentials",
        AuthError::InvalidEmail(_) => "invalid_email",
        AuthError::UserAlreadyExists => "exists",
        AuthError::WeakPassword(_) => "weak_password",
        AuthError::InvalidName(_) => "invalid_name",
        AuthError::GoogleDisabled => "google_disabled",
        AuthError::Google(_) => "google_failed",
        AuthError::InvalidSessionState => "invalid_state",
        AuthError::Repository(_) | AuthError::PasswordHash => "server",
    }
}

/// Redirect back to a form with an error code.
fn back_with_error(form_path: &str, code: &str) -> Response {
    Redirect::to(&format!("{form_path}?error={code}")).into_response()
}

/// Store the signed-in user in the session and go to the dashboard.
pub(crate) async fn start_session(session: &Session, user: &User) -> Response {
    let current = CurrentUser::from(user);
    if let Err(e) = set_current_user(session, &current).await {
        tracing::error!("Failed to set session: {}", e);
        return back_with_error("/auth/login", "session");
    }

    set_sentry_user(&current.id, Some(current.email.as_str()));
    add_breadcrumb("auth", "Signed in", None);

    Redirect::to("/dashboard").into_response()
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    LoginTemplate {
        error: query.error.as_deref().and_then(error_message),
        google_enabled: state.google().is_some(),
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => start_session(&session, &user).await,
        Err(e) => {
            let code = error_code(&e);
            if code == "server" {
                tracing::error!("Login failed: {}", e);
            } else {
                tracing::warn!("Login rejected: {}", e);
            }
            back_with_error("/auth/login", code)
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    RegisterTemplate {
        error: query.error.as_deref().and_then(error_message),
        google_enabled: state.google().is_some(),
    }
    .into_response()
}

/// Handle registration form submission. Signs the new user in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return back_with_error("/auth/register", "password_mismatch");
    }

    match AuthService::new(state.pool())
        .register_with_password(&form.email, &form.display_name, &form.password)
        .await
    {
        Ok(user) => start_session(&session, &user).await,
        Err(e) => {
            let code = error_code(&e);
            if code == "server" {
                tracing::error!("Registration failed: {}", e);
            } else {
                tracing::warn!("Registration rejected: {}", e);
            }
            back_with_error("/auth/register", code)
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout. Drops the session, cart included.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_have_messages() {
        let errors = [
            AuthError::InvalidCredentials,
            AuthError::UserAlreadyExists,
            AuthError::WeakPassword("short".to_string()),
            AuthError::InvalidName("long".to_string()),
            AuthError::GoogleDisabled,
            AuthError::InvalidSessionState,
            AuthError::PasswordHash,
        ];
        for err in &errors {
            assert!(error_message(error_code(err)).is_some(), "{err:?}");
        }
    }

    #[test]
    fn test_unknown_error_code_is_ignored() {
        assert_eq!(error_message("<script>"), None);
        assert_eq!(error_message(""), None);
    }

    #[test]
    fn test_login_page_renders_error() {
        let html = LoginTemplate {
            error: error_message("credentials"),
            google_enabled: false,
        }
        .render()
        .expect("render");
        assert!(html.contains("Email atau kata sandi salah."));
        assert!(!html.contains("/auth/google/login"));
    }

    #[test]
    fn test_register_page_shows_google_when_enabled() {
        let html = RegisterTemplate {
            error: None,
            google_enabled: true,
        }
        .render()
        .expect("render");
        assert!(html.contains("/auth/google/login"));
    }
}

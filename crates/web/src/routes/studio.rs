//! Content studio page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::services::StudioService;
use crate::state::AppState;
use crate::upload::MAX_FILE_SIZE;

/// Visual styles offered in the dropdown, as `(value, label)`.
pub const STYLES: &[(&str, &str)] = &[
    ("minimalis", "Minimalis"),
    ("ceria", "Ceria & warna-warni"),
    ("elegan", "Elegan"),
    ("tradisional", "Tradisional Nusantara"),
    ("vintage", "Vintage"),
];

/// Studio page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/studio.html")]
pub struct StudioTemplate {
    pub user: CurrentUser,
    pub active: &'static str,
    pub mock: bool,
    pub styles: &'static [(&'static str, &'static str)],
    pub max_file_mb: usize,
}

/// Render the upload form.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    StudioTemplate {
        user,
        active: "studio",
        mock: StudioService::new(state.gemini(), state.images()).is_mock(),
        styles: STYLES,
        max_file_mb: MAX_FILE_SIZE / 1024 / 1024,
    }
}

//! Current user.

use axum::Json;
use serde::Serialize;

use crate::middleware::RequireAuth;
use crate::models::CurrentUser;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: CurrentUser,
    pub initials: String,
}

/// `GET /api/me`
pub async fn show(RequireAuth(user): RequireAuth) -> Json<MeResponse> {
    Json(MeResponse {
        initials: user.initials(),
        user,
    })
}

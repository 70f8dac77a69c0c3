//! Content studio and design uploads.
//!
//! Both take a multipart form: field `image` (png, jpg, jpeg, webp; up to
//! 5MB) plus optional `prompt`, `style`, and `product_name`.

use axum::{
    Json,
    extract::{Multipart, State},
};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::services::{StudioResult, StudioService};
use crate::state::AppState;
use crate::upload::DesignForm;

/// `POST /api/studio/generate`: image plus marketing copy.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn generate(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Json<StudioResult>> {
    let form = DesignForm::from_multipart(multipart).await?;
    add_breadcrumb("studio", "Generate", Some(&[("file", form.image.file_name.as_str())]));

    let result = StudioService::new(state.gemini(), state.images())
        .generate(&form)
        .await?;

    Ok(Json(result))
}

/// `POST /api/design`: the image API's response, passed through.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn design(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let form = DesignForm::from_multipart(multipart).await?;

    let image = StudioService::new(state.gemini(), state.images())
        .design(&form)
        .await?;

    Ok(Json(image))
}

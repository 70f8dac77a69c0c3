//! Inventory API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use futures::StreamExt;
use tracing::instrument;

use tokoku_core::{Product, ProductFilter, ProductId, ProductInput};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::routes::views::ProductRow;
use crate::services::InventoryService;
use crate::state::AppState;

use super::snapshot_sse;

/// `GET /api/inventory?q=&category=`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductRow>>> {
    let products = InventoryService::new(state.pool(), state.hub())
        .list_products(user.id)
        .await?;

    Ok(Json(
        filter
            .apply(&products)
            .into_iter()
            .map(ProductRow::from)
            .collect(),
    ))
}

/// `POST /api/inventory`
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = InventoryService::new(state.pool(), state.hub())
        .add_product(user.id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/inventory/{id}`: full replace.
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let product = InventoryService::new(state.pool(), state.hub())
        .update_product(user.id, ProductId::new(id), input)
        .await?;

    Ok(Json(product))
}

/// `DELETE /api/inventory/{id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    InventoryService::new(state.pool(), state.hub())
        .delete_product(user.id, ProductId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/inventory/stream`: live table rows, newest product first.
pub async fn stream(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let rows = InventoryService::new(state.pool(), state.hub())
        .subscribe_products(user.id)
        .map(|snapshot| {
            snapshot.map(|products| products.iter().map(ProductRow::from).collect::<Vec<_>>())
        });

    snapshot_sse(rows)
}

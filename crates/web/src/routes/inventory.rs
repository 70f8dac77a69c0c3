//! Inventory page.
//!
//! The server renders the filtered table; `static/js/inventory.js` keeps it
//! live from `/api/inventory/stream` and submits edits to the JSON API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use tokoku_core::product::categories;
use tokoku_core::{InventorySummary, ProductFilter};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::views::ProductRow;
use crate::services::InventoryService;
use crate::state::AppState;

/// Inventory page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/inventory.html")]
pub struct InventoryTemplate {
    pub user: CurrentUser,
    pub active: &'static str,
    pub products: Vec<ProductRow>,
    pub total_count: usize,
    pub categories: Vec<String>,
    pub summary: InventorySummary,
    pub filter_query: String,
    pub filter_category: String,
}

/// Render the inventory table.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse> {
    let products = InventoryService::new(state.pool(), state.hub())
        .list_products(user.id)
        .await?;

    Ok(InventoryTemplate {
        active: "inventory",
        products: filter
            .apply(&products)
            .into_iter()
            .map(ProductRow::from)
            .collect(),
        total_count: products.len(),
        categories: categories(&products),
        summary: InventorySummary::from_products(&products),
        filter_query: filter.query.unwrap_or_default(),
        filter_category: filter.category.unwrap_or_else(|| "all".to_owned()),
        user,
    })
}

//! Dashboard insights.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::{AnalyticsService, Insights, InventoryService, SalesService};
use crate::state::AppState;

/// `GET /api/dashboard/insights`
///
/// Always answers 200 once the data loads; Gemini failures produce the
/// static fallback with `generated: false`.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn insights(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Insights>> {
    let products = InventoryService::new(state.pool(), state.hub())
        .list_products(user.id)
        .await?;
    let transactions = SalesService::new(state.pool(), state.hub())
        .list_transactions(user.id)
        .await?;

    let insights = AnalyticsService::new(state.gemini())
        .dashboard_insights(&products, &transactions)
        .await;

    Ok(Json(insights))
}

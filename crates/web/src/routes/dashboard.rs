//! Dashboard overview page.
//!
//! Figures are computed server-side from the user's inventory and sales.
//! AI insights are slow, so the page fetches `/api/dashboard/insights`
//! after it loads.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use tokoku_core::transaction::{revenue_by_day, top_products};
use tokoku_core::{InventorySummary, Rupiah, SalesSummary, StockLevel};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::views::{ProductRow, TransactionRow};
use crate::services::{InventoryService, SalesService};
use crate::state::AppState;

const RECENT_SALES: usize = 5;
const TOP_PRODUCTS: usize = 5;
const REVENUE_DAYS: usize = 7;

/// Revenue for one day.
pub struct DayRevenue {
    pub day: String,
    pub revenue: Rupiah,
}

/// Dashboard overview template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub user: CurrentUser,
    pub active: &'static str,
    pub inventory: InventorySummary,
    pub sales: SalesSummary,
    pub recent: Vec<TransactionRow>,
    pub low_stock: Vec<ProductRow>,
    pub top_products: Vec<(String, u64)>,
    pub daily: Vec<DayRevenue>,
}

/// Render the dashboard overview.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let products = InventoryService::new(state.pool(), state.hub())
        .list_products(user.id)
        .await?;
    let transactions = SalesService::new(state.pool(), state.hub())
        .list_transactions(user.id)
        .await?;

    let days = revenue_by_day(&transactions);
    let daily = days
        .iter()
        .rev()
        .take(REVENUE_DAYS)
        .map(|(day, revenue)| DayRevenue {
            day: day.format("%d %b").to_string(),
            revenue: *revenue,
        })
        .collect();

    Ok(DashboardTemplate {
        active: "dashboard",
        inventory: InventorySummary::from_products(&products),
        sales: SalesSummary::from_transactions(&transactions),
        recent: transactions
            .iter()
            .take(RECENT_SALES)
            .map(TransactionRow::from)
            .collect(),
        low_stock: products
            .iter()
            .filter(|p| p.stock_level() == StockLevel::Low)
            .map(ProductRow::from)
            .collect(),
        top_products: top_products(&transactions, TOP_PRODUCTS),
        daily,
        user,
    })
}

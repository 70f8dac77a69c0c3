//! Sales history page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use tokoku_core::{SalesSummary, TransactionFilter, TransactionStatus};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::views::TransactionRow;
use crate::services::SalesService;
use crate::services::sales::MAX_IMPORT_ROWS;
use crate::state::AppState;

/// Sales history template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/sales.html")]
pub struct SalesTemplate {
    pub user: CurrentUser,
    pub active: &'static str,
    pub transactions: Vec<TransactionRow>,
    pub total_count: usize,
    pub summary: SalesSummary,
    pub statuses: &'static [TransactionStatus],
    pub filter_status: &'static str,
    pub filter_query: String,
    pub max_import_rows: usize,
}

/// Render the sales history, filtered by status and search text.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(filter): Query<TransactionFilter>,
) -> Result<impl IntoResponse> {
    let transactions = SalesService::new(state.pool(), state.hub())
        .list_transactions(user.id)
        .await?;

    Ok(SalesTemplate {
        active: "sales",
        transactions: filter
            .apply(&transactions)
            .into_iter()
            .map(TransactionRow::from)
            .collect(),
        total_count: transactions.len(),
        summary: SalesSummary::from_transactions(&transactions),
        statuses: TransactionStatus::ALL,
        filter_status: filter.status.map_or("all", |s| s.as_str()),
        filter_query: filter.query.unwrap_or_default(),
        max_import_rows: MAX_IMPORT_ROWS,
        user,
    })
}

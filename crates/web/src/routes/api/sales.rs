//! Sales API.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use futures::StreamExt;
use serde::Serialize;
use tracing::instrument;

use tokoku_core::{Transaction, TransactionFilter, TransactionInput};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::routes::views::TransactionRow;
use crate::services::SalesService;
use crate::state::AppState;

use super::snapshot_sse;

/// Result of an import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub transactions: Vec<Transaction>,
}

/// `GET /api/sales?status=&q=`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<TransactionRow>>> {
    let transactions = SalesService::new(state.pool(), state.hub())
        .list_transactions(user.id)
        .await?;

    Ok(Json(
        filter
            .apply(&transactions)
            .into_iter()
            .map(TransactionRow::from)
            .collect(),
    ))
}

/// `POST /api/sales`
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<TransactionInput>,
) -> Result<(StatusCode, Json<Transaction>)> {
    let transaction = SalesService::new(state.pool(), state.hub())
        .record_transaction(user.id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// `POST /api/sales/import`: a JSON array of sales, all or nothing.
#[instrument(skip(state, user, rows), fields(user_id = %user.id, rows = rows.len()))]
pub async fn import(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(rows): Json<Vec<TransactionInput>>,
) -> Result<(StatusCode, Json<ImportResponse>)> {
    let transactions = SalesService::new(state.pool(), state.hub())
        .import_transactions(user.id, rows)
        .await?;

    let imported = transactions.len().to_string();
    add_breadcrumb("sales", "Imported sales", Some(&[("rows", imported.as_str())]));

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            imported: transactions.len(),
            transactions,
        }),
    ))
}

/// `GET /api/sales/stream`: live history rows, newest first.
pub async fn stream(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let rows = SalesService::new(state.pool(), state.hub())
        .subscribe_transactions(user.id)
        .map(|snapshot| {
            snapshot.map(|transactions| {
                transactions
                    .iter()
                    .map(TransactionRow::from)
                    .collect::<Vec<_>>()
            })
        });

    snapshot_sse(rows)
}

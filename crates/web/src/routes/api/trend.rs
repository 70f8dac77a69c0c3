//! Monthly product trends.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::{TrendQuery, TrendService};
use crate::state::AppState;

/// `GET /api/trend?month=&year=`
///
/// Answers 400 for a month outside 1-12 or a year outside 2000-2100.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<TrendQuery>,
) -> Result<Json<serde_json::Value>> {
    let trend = TrendService::new(state.gemini(), state.trend_cache())
        .trend(query)
        .await?;

    Ok(Json(trend))
}

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::services::growth_service::{self, GrowthEstimate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:ticker", get(ticker_growth))
}

#[derive(Debug, Deserialize)]
pub struct GrowthParams {
    years: Option<u32>,
}

/// GET /api/growth/:ticker?years=5
/// Advisory historical annualized growth for a ticker. Thin or missing data
/// yields an "insufficient data" suggestion instead of an error status.
#[axum::debug_handler]
pub async fn ticker_growth(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<GrowthParams>,
) -> Json<GrowthEstimate> {
    let years = params.years.unwrap_or(5);
    info!("GET /api/growth/{} - years={}", ticker, years);

    let estimate = growth_service::historical_growth(state.growth.as_ref(), &ticker, years).await;

    Json(estimate)
}

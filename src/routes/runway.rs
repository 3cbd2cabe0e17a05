use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{RunwayRequest, RunwayResponse};
use crate::services::runway_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(runway_projection))
}

/// POST /api/runway
/// Project how long liquid assets will last for the supplied snapshot of
/// assets, debts, income and expenses. The projection itself is
/// deterministic; only the advisory historical-growth lookup touches the
/// network, and it degrades silently to defaults.
#[axum::debug_handler]
pub async fn runway_projection(
    State(state): State<AppState>,
    Json(request): Json<RunwayRequest>,
) -> Result<Json<RunwayResponse>, AppError> {
    info!(
        "POST /api/runway - {} assets, {} debts",
        request.assets.len(),
        request.debts.len()
    );

    let result = runway_service::project_runway(&request, Some(state.growth.as_ref())).await?;

    info!(
        "Runway calculated: {} years ({:?})",
        result.runway_years, result.runway_status
    );

    Ok(Json(result))
}

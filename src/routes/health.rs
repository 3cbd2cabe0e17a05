use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

async fn health() -> Json<Value> {
    info!("GET /health - Health check");
    Json(json!({
        "status": "ok",
        "service": "runwise-backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "runwise-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "runway": "POST /api/runway",
            "import": "POST /api/import",
            "growth": "GET /api/growth/:ticker",
            "health": "GET /health",
        }
    }))
}

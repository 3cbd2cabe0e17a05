use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::info;

use crate::errors::AppError;
use crate::models::{ImportRequest, ImportResponse};
use crate::services::import_service;
use crate::state::AppState;

// Callers gate uploads at 10 MB of decoded content.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(import_statement))
}

/// POST /api/import
/// Analyze a base64-encoded brokerage statement (pdf, csv or xlsx) and
/// extract asset holdings for user preview. Bad payloads are rejected;
/// everything past that point degrades to a well-formed response with
/// warnings rather than an error.
#[axum::debug_handler]
pub async fn import_statement(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    info!(
        "POST /api/import - file_type={:?}, file_name={:?}",
        request.file_type, request.file_name
    );

    let bytes = STANDARD
        .decode(request.file_content.as_bytes())
        .map_err(|e| AppError::Validation(format!("Invalid file content: {}", e)))?;

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "File too large. Maximum size is 10MB.".to_string(),
        ));
    }

    let result = import_service::analyze_statement(
        state.llm.as_deref(),
        &bytes,
        request.file_type,
        request.file_name.as_deref(),
    )
    .await;

    info!(
        "Import analysis complete: {} assets found, confidence={}",
        result.assets.len(),
        result.confidence
    );

    Ok(Json(result))
}

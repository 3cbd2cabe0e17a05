/// Import pipeline integration tests
///
/// Drive the extraction -> recovery -> normalization chain end to end with a
/// canned text-generation collaborator, and hit the HTTP surface for the
/// request-level validations.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tower::util::ServiceExt;

use runwise_backend::app::create_app;
use runwise_backend::config::Settings;
use runwise_backend::errors::LlmError;
use runwise_backend::external::growth_provider::{
    GrowthDataProvider, GrowthPoint, GrowthProviderError,
};
use runwise_backend::models::{AssetType, FileType};
use runwise_backend::services::import_service::analyze_statement;
use runwise_backend::services::llm_service::LlmProvider;
use runwise_backend::state::AppState;

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

struct CannedLlm(String);

#[async_trait]
impl LlmProvider for CannedLlm {
    async fn generate_completion(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        Ok(self.0.clone())
    }
}

struct NoHistoryProvider;

#[async_trait]
impl GrowthDataProvider for NoHistoryProvider {
    async fn fetch_daily_history(
        &self,
        _ticker: &str,
        _years: u32,
    ) -> Result<Vec<GrowthPoint>, GrowthProviderError> {
        Ok(vec![])
    }
}

fn test_state() -> AppState {
    AppState {
        settings: Settings::from_env(),
        llm: None,
        growth: Arc::new(NoHistoryProvider),
    }
}

fn statement_csv() -> Vec<u8> {
    let mut csv = String::from("name,ticker,shares,price,value\n");
    csv.push_str("Apple Inc.,AAPL,100,185.50,18550.00\n");
    csv.push_str("Vanguard S&P 500 ETF,VOO,25,440.00,11000.00\n");
    csv.into_bytes()
}

// ---------------------------------------------------------------------------
// Pipeline behavior
// ---------------------------------------------------------------------------

mod pipeline {
    use super::*;

    #[tokio::test]
    async fn fenced_model_output_yields_typed_holdings() {
        let canned = CannedLlm(
            r#"Here is what I found:
```json
{
  "assets": [
    {"name": "Apple Inc.", "type": "stock", "ticker": "AAPL",
     "total_value": 18550.0, "current_price": 185.5, "confidence": 0.95},
    {"name": "Vanguard S&P 500 ETF", "type": "etf", "ticker": "VOO",
     "shares": 25.0, "confidence": 0.9}
  ],
  "source_info": {"broker": "Schwab", "statement_date": "2024-01-15"},
  "warnings": [],
  "confidence": 0.9
}
```"#
                .to_string(),
        );

        let response =
            analyze_statement(Some(&canned), &statement_csv(), FileType::Csv, None).await;

        assert_eq!(response.assets.len(), 2);
        // Shares derived from total_value / current_price.
        assert!((response.assets[0].shares - 100.0).abs() < 1e-9);
        assert_eq!(response.assets[0].asset_type, AssetType::Stock);
        assert_eq!(response.assets[1].shares, 25.0);
        assert_eq!(response.source_info.broker.as_deref(), Some("Schwab"));
        assert_eq!(response.confidence, 0.9);
    }

    #[tokio::test]
    async fn unparseable_model_output_degrades_with_warning() {
        let canned = CannedLlm("I could not find any holdings, sorry!".to_string());

        let response =
            analyze_statement(Some(&canned), &statement_csv(), FileType::Csv, None).await;

        assert!(response.assets.is_empty());
        assert_eq!(response.confidence, 0.0);
        assert!(response.warnings[0].starts_with("Analysis failed"));
    }

    #[tokio::test]
    async fn oversized_document_is_truncated_and_capped() {
        let mut csv = String::from("name,shares\n");
        for i in 0..2_000 {
            csv.push_str(&format!("Holding number {},{}\n", i, i));
        }
        assert!(csv.len() > 15_000);

        let canned = CannedLlm(r#"{"assets": [], "confidence": 0.95}"#.to_string());
        let response =
            analyze_statement(Some(&canned), csv.as_bytes(), FileType::Csv, None).await;

        assert_eq!(response.confidence, 0.7);
        assert!(response.warnings.iter().any(|w| w.contains("truncated")));
    }

    #[tokio::test]
    async fn near_empty_document_skips_the_model() {
        // The canned output would parse fine; it must never be consulted.
        let canned = CannedLlm(
            r#"{"assets": [{"name": "Ghost", "type": "stock", "shares": 1.0}]}"#.to_string(),
        );
        let response = analyze_statement(Some(&canned), b"a,b\n", FileType::Csv, None).await;

        assert!(response.assets.is_empty());
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.warnings.len(), 1);
    }

    #[tokio::test]
    async fn missing_llm_configuration_degrades() {
        let response = analyze_statement(None, &statement_csv(), FileType::Csv, None).await;

        assert!(response.assets.is_empty());
        assert_eq!(response.confidence, 0.0);
        assert!(response.warnings[0].contains("not configured"));
    }
}

// ---------------------------------------------------------------------------
// HTTP surface
// ---------------------------------------------------------------------------

mod http_surface {
    use super::*;

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let app = create_app(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "runwise-backend");
    }

    #[tokio::test]
    async fn invalid_base64_is_rejected() {
        let app = create_app(test_state());
        let payload = serde_json::json!({
            "file_content": "not base64!!!",
            "file_type": "csv"
        });
        let response = app
            .oneshot(
                Request::post("/api/import")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn import_without_llm_still_returns_well_formed_response() {
        let app = create_app(test_state());
        let payload = serde_json::json!({
            "file_content": STANDARD.encode(statement_csv()),
            "file_type": "csv",
            "file_name": "statement.csv"
        });
        let response = app
            .oneshot(
                Request::post("/api/import")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["assets"].as_array().unwrap().len(), 0);
        assert_eq!(json["confidence"], 0.0);
        assert!(!json["warnings"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn runway_endpoint_validates_schema() {
        let app = create_app(test_state());
        let response = app
            .oneshot(
                Request::post("/api/runway")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn runway_endpoint_projects_valid_request() {
        let app = create_app(test_state());
        let payload = serde_json::json!({
            "assets": [{
                "id": "asset-1",
                "name": "Emergency Fund",
                "type": "cash",
                "balance": 25_000.0,
                "currency": "USD"
            }],
            "debts": [],
            "annual_passive_income": 1_000.0,
            "annual_expenses": 12_000.0,
            "net_worth": 25_000.0,
            "currency": "USD"
        });
        let response = app
            .oneshot(
                Request::post("/api/runway")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["runway_years"].as_u64().unwrap() >= 1);
        assert_eq!(json["runway_status"], "critical");
        assert!(json["projection"].as_array().unwrap().len() >= 2);
    }
}

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::models::{AssetType, ExtractedHolding, FileType, ImportResponse, SourceInfo};
use crate::services::llm_service::{import_user_prompt, LlmProvider, IMPORT_SYSTEM_PROMPT};
use crate::services::recovery;
use crate::services::text_extract;

/// Documents are truncated to this many characters before the model call to
/// stay within token limits.
pub const MAX_DOCUMENT_CHARS: usize = 15_000;

/// Below this much usable text the document is treated as empty and no model
/// call is attempted.
pub const MIN_USABLE_CHARS: usize = 50;

const TRUNCATION_WARNING: &str =
    "Document was truncated due to size. Some assets may be missing.";
const TRUNCATION_CONFIDENCE_CAP: f64 = 0.7;
const DEFAULT_OVERALL_CONFIDENCE: f64 = 0.8;

/// Analyze a brokerage statement: extract text, hand it to the model for
/// field guessing, then recover and validate the result. Every failure
/// degrades to a well-formed empty response with warnings; the caller never
/// sees an error from this pipeline.
pub async fn analyze_statement(
    llm: Option<&dyn LlmProvider>,
    bytes: &[u8],
    file_type: FileType,
    file_name: Option<&str>,
) -> ImportResponse {
    let document_text = match text_extract::extract_text(bytes, file_type) {
        Ok(text) => text,
        Err(e) => {
            error!("text extraction failed for {:?}: {}", file_name, e);
            return empty_response(e.to_string());
        }
    };

    if document_text.trim().chars().count() < MIN_USABLE_CHARS {
        return empty_response(
            "Document appears to be empty or contains very little text".to_string(),
        );
    }

    let char_count = document_text.chars().count();
    let truncated = char_count > MAX_DOCUMENT_CHARS;
    let document_text: String = if truncated {
        document_text.chars().take(MAX_DOCUMENT_CHARS).collect()
    } else {
        document_text
    };

    let Some(llm) = llm else {
        return empty_response("Analysis failed: text generation is not configured".to_string());
    };

    let completion = match llm
        .generate_completion(IMPORT_SYSTEM_PROMPT, &import_user_prompt(&document_text))
        .await
    {
        Ok(content) => content,
        Err(e) => {
            error!("statement analysis failed: {}", e);
            return empty_response(format!("Analysis failed: {}", e));
        }
    };

    let raw = match recovery::recover_json(&completion) {
        Ok(value) => value,
        Err(e) => {
            error!("statement analysis failed: {}", e);
            return empty_response(format!("Analysis failed: {}", e));
        }
    };

    let response = normalize_extraction(&raw, truncated);
    info!(
        "statement analysis complete: {} assets, confidence={}",
        response.assets.len(),
        response.confidence
    );
    response
}

fn empty_response(warning: String) -> ImportResponse {
    ImportResponse {
        assets: Vec::new(),
        source_info: SourceInfo::default(),
        warnings: vec![warning],
        confidence: 0.0,
    }
}

// Loosely-typed candidate as the model emitted it. Validation into
// ExtractedHolding happens in one place; anything failing it is dropped with
// a warning instead of failing the whole extraction.
#[derive(Debug, Deserialize)]
struct RawCandidate {
    name: String,
    #[serde(rename = "type")]
    asset_type: AssetType,
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    shares: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    market: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    total_value: Option<f64>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Validates the recovered mapping into a typed ImportResponse. Missing
/// share counts are derived from total_value / current_price; a truncated
/// source document caps overall confidence at 0.7.
pub fn normalize_extraction(raw: &Value, truncated: bool) -> ImportResponse {
    let mut holdings = Vec::new();
    let mut warnings = Vec::new();

    let candidates = raw
        .get("assets")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    for candidate in candidates {
        let label = candidate
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unnamed asset")
            .to_string();

        let parsed: RawCandidate = match serde_json::from_value(candidate) {
            Ok(parsed) => parsed,
            Err(e) => {
                warnings.push(format!("Skipped '{}': {}", label, e));
                continue;
            }
        };

        let shares = match parsed.shares {
            Some(shares) if shares >= 0.0 => shares,
            Some(_) => {
                warnings.push(format!("Skipped '{}': negative share count", label));
                continue;
            }
            None => {
                match (parsed.total_value, parsed.current_price) {
                    (Some(total), Some(price)) if price > 0.0 => total / price,
                    _ => {
                        warnings.push(format!(
                            "Skipped '{}': share count missing and not derivable",
                            label
                        ));
                        continue;
                    }
                }
            }
        };

        holdings.push(ExtractedHolding {
            name: parsed.name,
            asset_type: parsed.asset_type,
            ticker: parsed.ticker,
            shares,
            currency: parsed.currency.unwrap_or_else(|| "USD".to_string()),
            market: parsed.market,
            current_price: parsed.current_price,
            total_value: parsed.total_value,
            confidence: parsed.confidence.unwrap_or(1.0).clamp(0.0, 1.0),
        });
    }

    let source_info = raw
        .get("source_info")
        .cloned()
        .and_then(|v| serde_json::from_value::<SourceInfo>(v).ok())
        .unwrap_or_default();

    if let Some(model_warnings) = raw.get("warnings").and_then(Value::as_array) {
        warnings.extend(
            model_warnings
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string),
        );
    }

    let mut confidence = raw
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_OVERALL_CONFIDENCE)
        .clamp(0.0, 1.0);

    if truncated {
        warnings.push(TRUNCATION_WARNING.to_string());
        confidence = confidence.min(TRUNCATION_CONFIDENCE_CAP);
    }

    ImportResponse {
        assets: holdings,
        source_info,
        warnings,
        confidence,
    }
}

use serde::Serialize;
use tracing::warn;

use crate::external::growth_provider::{GrowthDataProvider, GrowthPoint};

const MIN_SPAN_YEARS: f64 = 0.5;

pub const CONSERVATIVE_SUGGESTION: &str =
    "Use a conservative estimate (5-7% for stocks, 2-3% for bonds)";

/// Historical growth is advisory: insufficient data and provider failures
/// both degrade to a suggestion, never a hard error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GrowthEstimate {
    Annualized {
        ticker: String,
        annualized_growth: f64,
        years_analyzed: f64,
        start_price: f64,
        end_price: f64,
        start_date: String,
        end_date: String,
    },
    Insufficient {
        ticker: String,
        error: String,
        suggestion: String,
    },
}

impl GrowthEstimate {
    fn insufficient(ticker: &str, error: impl Into<String>) -> Self {
        GrowthEstimate::Insufficient {
            ticker: ticker.to_string(),
            error: error.into(),
            suggestion: CONSERVATIVE_SUGGESTION.to_string(),
        }
    }

    pub fn rate(&self) -> Option<f64> {
        match self {
            GrowthEstimate::Annualized {
                annualized_growth, ..
            } => Some(*annualized_growth),
            GrowthEstimate::Insufficient { .. } => None,
        }
    }
}

pub async fn historical_growth(
    provider: &dyn GrowthDataProvider,
    ticker: &str,
    years: u32,
) -> GrowthEstimate {
    match provider.fetch_daily_history(ticker, years).await {
        Ok(history) => annualized_from_history(ticker, &history),
        Err(e) => {
            warn!("growth lookup for {} failed: {}", ticker, e);
            GrowthEstimate::insufficient(ticker, e.to_string())
        }
    }
}

/// CAGR over the realized span: (end/start)^(1/actual_years) - 1. Less than
/// six months of data is "insufficient" rather than an extrapolation.
pub fn annualized_from_history(ticker: &str, history: &[GrowthPoint]) -> GrowthEstimate {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return GrowthEstimate::insufficient(ticker, "Insufficient historical data");
    };
    if history.len() < 2 {
        return GrowthEstimate::insufficient(ticker, "Insufficient historical data");
    }

    let actual_years = (last.date - first.date).num_days() as f64 / 365.25;
    if actual_years < MIN_SPAN_YEARS {
        return GrowthEstimate::insufficient(ticker, "Less than 6 months of data available");
    }

    if first.close <= 0.0 || last.close <= 0.0 {
        return GrowthEstimate::insufficient(ticker, "Non-positive price in history");
    }

    let annualized = (last.close / first.close).powf(1.0 / actual_years) - 1.0;

    GrowthEstimate::Annualized {
        ticker: ticker.to_string(),
        annualized_growth: annualized,
        years_analyzed: actual_years,
        start_price: first.close,
        end_price: last.close,
        start_date: first.date.to_string(),
        end_date: last.date.to_string(),
    }
}

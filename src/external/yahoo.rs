use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use crate::external::growth_provider::{GrowthDataProvider, GrowthPoint, GrowthProviderError};

pub struct YahooProvider {
    client: reqwest::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    close: Vec<Option<f64>>,
}

#[async_trait]
impl GrowthDataProvider for YahooProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<Vec<GrowthPoint>, GrowthProviderError> {
        // Yahoo supports ranges like "1y", "5y". We map the lookback roughly;
        // CAGR only needs span endpoints, so monthly bars suffice past a year.
        let (range, interval) = match years {
            0 | 1 => ("1y", "1d"),
            2..=5 => ("5y", "1mo"),
            _ => ("10y", "1mo"),
        };

        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{ticker}?range={range}&interval={interval}"
        );

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GrowthProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GrowthProviderError::RateLimited);
        }

        let body = resp
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| GrowthProviderError::Parse(e.to_string()))?;

        let result = body
            .chart
            .result
            .and_then(|mut r| r.pop())
            .ok_or_else(|| GrowthProviderError::BadResponse("missing result".into()))?;

        // timestamp aligns with close list by index
        let closes = result
            .indicators
            .quote
            .first()
            .ok_or_else(|| GrowthProviderError::BadResponse("missing quote".into()))?
            .close
            .clone();

        let mut out = Vec::new();

        for (i, ts) in result.timestamp.iter().enumerate() {
            let close = closes.get(i).and_then(|v| *v);

            // skip missing closes
            let Some(close) = close else { continue };

            let dt = DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| GrowthProviderError::Parse("bad timestamp".into()))?;

            out.push(GrowthPoint {
                date: dt.date_naive(),
                close,
            });
        }

        // Ensure ascending by date
        out.sort_by_key(|p| p.date);

        Ok(out)
    }
}

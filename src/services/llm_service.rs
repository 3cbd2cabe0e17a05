use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::errors::LlmError;

/// Configuration for the text-generation collaborator. Passed explicitly into
/// the provider; the deterministic components never see it.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            max_tokens: 4000,
            temperature: 0.1,
        }
    }
}

/// Trait for text-generation providers. The return value is untrusted free
/// text; callers run it through structured recovery, never parse it blindly.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate_completion(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI-compatible chat completions provider; the base URL is configurable
/// so any compatible gateway works.
pub struct OpenAiProvider {
    config: LlmConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    async fn call_with_retry(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let mut retry_count = 0;
        let max_retries = 3;
        let mut delay = Duration::from_secs(1);

        loop {
            match self.call_chat(&request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    retry_count += 1;
                    if retry_count >= max_retries {
                        error!("LLM call failed after {} retries: {}", max_retries, e);
                        return Err(e);
                    }

                    warn!(
                        "LLM call failed (attempt {}/{}): {}. Retrying in {:?}...",
                        retry_count, max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2; // Exponential backoff: 1s, 2s, 4s
                }
            }
        }
    }

    async fn call_chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate_completion(&self, system: &str, user: &str) -> Result<String, LlmError> {
        info!(
            "Generating LLM completion (model: {}, max_tokens: {})",
            self.config.model, self.config.max_tokens
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self.call_with_retry(request).await?;

        let content = response
            .choices
            .first()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?
            .message
            .content
            .clone();

        if let Some(usage) = response.usage {
            info!(
                "LLM completion generated. Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(content)
    }
}

/// System prompt for brokerage-statement field extraction. The model only
/// guesses candidate fields from unstructured text; validation, share
/// derivation and confidence handling happen downstream.
pub const IMPORT_SYSTEM_PROMPT: &str = r#"You are a financial document parser specializing in brokerage statements.

Extract asset holdings from the provided document text. For each asset found, extract:
- name: Full company or fund name (e.g., "Apple Inc.", "Vanguard S&P 500 ETF")
- type: One of [stock, etf, bond, crypto, cash, deposit, real_estate, other]
  - Use "etf" for ETFs, index funds, and mutual funds
  - Use "stock" for individual company stocks
  - Use "bond" for bonds and fixed income
  - Use "crypto" for cryptocurrencies
  - Use "cash" for cash holdings
  - Use "deposit" for money market or savings
- ticker: Stock symbol if available (e.g., "AAPL", "VOO")
- shares: Number of shares or units held (must be a number)
- currency: Trading currency (e.g., "USD", "EUR", "TWD")
- market: Exchange name if known (e.g., "NASDAQ", "NYSE", "TSE")
- current_price: Price per share if shown in document
- total_value: Total value if shown (or calculate as shares x price)
- confidence: Your confidence in this extraction (0.0 to 1.0)

Also extract source information:
- broker: Name of the brokerage if identifiable
- statement_date: Date of the statement if found (ISO format: YYYY-MM-DD)
- account_type: Type of account if mentioned (e.g., "Individual", "IRA", "401k")

Return ONLY valid JSON (no markdown):
{
  "assets": [
    {
      "name": "Apple Inc.",
      "type": "stock",
      "ticker": "AAPL",
      "shares": 100.0,
      "currency": "USD",
      "market": "NASDAQ",
      "current_price": 185.50,
      "total_value": 18550.0,
      "confidence": 0.95
    }
  ],
  "source_info": {
    "broker": "Schwab",
    "statement_date": "2024-01-15",
    "account_type": "Individual"
  },
  "warnings": ["Some text was unclear"],
  "confidence": 0.9
}

Rules:
- Only extract clear holdings, NOT pending orders, historical transactions, or dividends
- If a field is unclear, use null
- If shares count is missing but total value and price are available, calculate shares
- Be conservative - only include assets you're confident about
- Include a warning for any ambiguous or partially extracted data
- Set overall confidence based on document quality and extraction certainty
"#;

pub fn import_user_prompt(document: &str) -> String {
    format!(
        "Document content:\n\n{}\n\nExtract all asset holdings. Return JSON only.",
        document
    )
}

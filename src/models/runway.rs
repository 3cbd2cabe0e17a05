use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::AssetType;

// Projection input: a point-in-time snapshot of one asset.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default)]
    pub ticker: Option<String>,
    pub balance: f64,
    pub currency: String,
    // Optional bucketed growth rates, e.g. {"5y": 0.12, "10y": 0.08}.
    #[serde(default)]
    pub growth_rates: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub debt_type: String,
    pub current_balance: f64,
    // Annual rate as decimal (0.06 = 6%).
    pub interest_rate: f64,
    pub monthly_payment: f64,
}

// Compressed monthly income/expense totals, month in YYYY-MM format.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyStats {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunwayRequest {
    pub assets: Vec<Asset>,
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub monthly_passive_income: f64,
    #[serde(default)]
    pub monthly_expenses: f64,
    #[serde(default)]
    pub monthly_gap: f64,
    pub annual_passive_income: f64,
    pub annual_expenses: f64,
    #[serde(default)]
    pub annual_gap: f64,
    #[serde(default)]
    pub monthly_history: Vec<MonthlyStats>,
    pub net_worth: f64,
    pub currency: String,
    // IANA timezone, e.g. "America/New_York"; used to pick an inflation region.
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assumptions {
    pub inflation_rate: f64,
    // Keyed by asset type (stock, etf, bond, ...).
    pub growth_rates: HashMap<String, f64>,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub withdrawal_order: Vec<String>,
    pub keep_assets: Vec<String>,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: u32,
    pub net_worth: f64,
    pub assets: f64,
    pub debts: f64,
    pub expenses: f64,
    pub passive_income: f64,
    pub gap: f64,
    pub notes: Option<String>,
}

// Informational annotation attached to a specific simulation year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub year: u32,
    pub event: String,
    pub impact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunwayStatus {
    Infinite,
    Finite,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunwayResponse {
    pub assumptions: Assumptions,
    pub strategy: Strategy,
    pub projection: Vec<YearProjection>,
    pub milestones: Vec<Milestone>,
    pub suggestions: Vec<String>,
    pub runway_years: u32,
    pub runway_status: RunwayStatus,
}

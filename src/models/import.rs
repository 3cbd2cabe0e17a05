use serde::{Deserialize, Serialize};

// Asset classification shared by the import and runway paths. ETFs, index
// funds and mutual funds all map to Etf; money market and savings map to
// Deposit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Stock,
    Etf,
    Bond,
    Crypto,
    Cash,
    Deposit,
    RealEstate,
    Other,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Etf => "etf",
            AssetType::Bond => "bond",
            AssetType::Crypto => "crypto",
            AssetType::Cash => "cash",
            AssetType::Deposit => "deposit",
            AssetType::RealEstate => "real_estate",
            AssetType::Other => "other",
        }
    }
}

// A single holding extracted from a brokerage statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedHolding {
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub ticker: Option<String>,
    pub shares: f64,
    pub currency: String,
    pub market: Option<String>,
    pub current_price: Option<f64>,
    pub total_value: Option<f64>,
    pub confidence: f64,
}

// Descriptive metadata about the source document. No invariants beyond
// optionality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceInfo {
    pub broker: Option<String>,
    pub statement_date: Option<String>,
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Csv,
    Xlsx,
}

// Request to analyze a brokerage statement file. file_content is base64.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest {
    pub file_content: String,
    pub file_type: FileType,
    pub file_name: Option<String>,
}

// Always well-formed: every failure in the import pipeline degrades to an
// empty or partial result with warnings instead of an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    pub assets: Vec<ExtractedHolding>,
    pub source_info: SourceInfo,
    pub warnings: Vec<String>,
    pub confidence: f64,
}

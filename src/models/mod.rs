mod import;
mod runway;

pub use import::{
    AssetType, ExtractedHolding, FileType, ImportRequest, ImportResponse, SourceInfo,
};
pub use runway::{
    Asset, Assumptions, Debt, Milestone, MonthlyStats, RunwayRequest, RunwayResponse,
    RunwayStatus, Strategy, YearProjection,
};

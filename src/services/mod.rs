pub mod amortization;
pub mod growth_service;
pub mod import_service;
pub mod llm_service;
pub mod rates;
pub mod recovery;
pub mod runway_service;
pub mod text_extract;

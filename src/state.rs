use std::sync::Arc;

use crate::config::Settings;
use crate::external::growth_provider::GrowthDataProvider;
use crate::services::llm_service::LlmProvider;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub llm: Option<Arc<dyn LlmProvider>>,
    pub growth: Arc<dyn GrowthDataProvider>,
}

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use runwise_backend::app;
use runwise_backend::config::Settings;
use runwise_backend::external::growth_provider::GrowthDataProvider;
use runwise_backend::external::yahoo::YahooProvider;
use runwise_backend::services::llm_service::{LlmConfig, LlmProvider, OpenAiProvider};
use runwise_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env();

    // Initialize logging FIRST
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&settings.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let llm: Option<Arc<dyn LlmProvider>> = if settings.llm_configured() {
        tracing::info!("📊 Statement analysis model: {}", settings.model_name);
        Some(Arc::new(OpenAiProvider::new(LlmConfig {
            api_base: settings.openai_api_base.clone(),
            api_key: settings.openai_api_key.clone(),
            model: settings.model_name.clone(),
            ..LlmConfig::default()
        })))
    } else {
        tracing::warn!(
            "OPENAI_API_KEY not set; statement analysis will return empty results"
        );
        None
    };

    let growth: Arc<dyn GrowthDataProvider> = Arc::new(YahooProvider::new());

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    let state = AppState {
        settings,
        llm,
        growth,
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 runwise backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

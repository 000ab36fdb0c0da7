use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tabulens::application::{
    ChartSelector, ConversationContextManager, HealthService, ReportService,
    StructuredInsightClient, Summarizer, TabularIngestor,
};
use tabulens::infrastructure::config::AppConfig;
use tabulens::infrastructure::db::connection::init_db;
use tabulens::infrastructure::db::{QuestionRepository, ReportRepository};
use tabulens::infrastructure::llm_clients::{GroqClient, LLMClient};
use tabulens::interfaces::http::{start_server, HttpState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().expect("Failed to load configuration");

    if config.llm.api_key.is_none() {
        tracing::warn!("GROQ_API_KEY not set; insight generation will be unavailable");
    }

    let pool = init_db(&config.database_path)
        .await
        .expect("Failed to initialize database");

    let llm: Arc<dyn LLMClient + Send + Sync> = Arc::new(
        GroqClient::new(Duration::from_secs(config.llm.timeout_secs))
            .expect("Failed to build generation client"),
    );

    let report_service = Arc::new(ReportService::new(
        TabularIngestor::new(config.max_upload_bytes),
        Summarizer::new(config.digest.clone()),
        ChartSelector::default(),
        StructuredInsightClient::new(llm.clone(), config.llm.clone()),
        ConversationContextManager::new(config.max_context_tokens),
        ReportRepository::new(pool.clone()),
        QuestionRepository::new(pool.clone()),
        config.max_stored_reports,
    ));

    let health_service = Arc::new(HealthService::new(pool, llm, config.llm.clone()));

    let state = web::Data::new(HttpState {
        report_service,
        health_service,
    });

    // Base64 inflates uploads by ~4/3; leave headroom on top of the raw cap
    let json_limit = config.max_upload_bytes * 2;

    info!(
        address = %config.bind_address,
        port = config.port,
        "Starting tabulens"
    );

    start_server(state, &config.bind_address, config.port, json_limit)?.await
}

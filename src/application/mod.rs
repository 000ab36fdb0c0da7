pub mod use_cases;

pub use use_cases::chart_selector::ChartSelector;
pub use use_cases::context_manager::ConversationContextManager;
pub use use_cases::export_service::ExportService;
pub use use_cases::health_service::HealthService;
pub use use_cases::ingestor::TabularIngestor;
pub use use_cases::insight_client::StructuredInsightClient;
pub use use_cases::report_service::ReportService;
pub use use_cases::summarizer::Summarizer;

pub mod chart_selector;
pub mod context_manager;
pub mod export_service;
pub mod health_service;
pub mod ingestor;
pub mod insight_client;
pub mod insight_prompt;
pub mod report_service;
pub mod summarizer;

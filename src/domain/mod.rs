pub mod chart;
pub mod conversation;
pub mod dataset;
pub mod digest;
pub mod error;
pub mod insight;
pub mod llm_config;
pub mod report;

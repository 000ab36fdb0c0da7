use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::application::use_cases::summarizer::SummarizerConfig;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;

/// Application configuration.
///
/// Layered: built-in defaults, then `tabulens.toml`, then `TABULENS_*`
/// environment variables (`__` separates nesting, e.g.
/// `TABULENS_LLM__MODEL`). `GROQ_API_KEY` is honored as a fallback for the
/// generation service key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub database_path: PathBuf,

    /// Raw upload byte ceiling
    pub max_upload_bytes: usize,

    /// Stored reports kept after cleanup (oldest pruned first)
    pub max_stored_reports: usize,

    /// Token budget for follow-up context assembly
    pub max_context_tokens: usize,

    pub digest: SummarizerConfig,
    pub llm: LLMConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
            database_path: PathBuf::from("data/tabulens.db"),
            max_upload_bytes: 5 * 1024 * 1024,
            max_stored_reports: 5,
            max_context_tokens: 3000,
            digest: SummarizerConfig::default(),
            llm: LLMConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let mut config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("tabulens.toml"))
            .merge(Env::prefixed("TABULENS_").split("__"))
            .extract()
            .map_err(|e| AppError::Internal(format!("Invalid configuration: {}", e)))?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("GROQ_API_KEY").ok();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.max_stored_reports, 5);
        assert_eq!(config.port, 5000);
    }
}

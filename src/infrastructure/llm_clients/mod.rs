pub mod groq;

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;

pub use groq::GroqClient;

/// Text-completion call against the external generation service.
/// The service is untrusted with respect to output shape; callers always
/// validate the returned text before using it.
#[async_trait]
pub trait LLMClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;
}

use serde::{Deserialize, Serialize};

/// Connection settings for the OpenAI-compatible chat-completions endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Request-scoped timeout for a single generation call
    pub timeout_secs: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            max_tokens: Some(800),
            temperature: Some(0.2),
            timeout_secs: 30,
        }
    }
}

impl LLMConfig {
    pub fn with_max_tokens(&self, max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..self.clone()
        }
    }
}

// ============================================================
// STRUCTURED INSIGHT CLIENT
// ============================================================
// Invoke the generation service and enforce the response
// contract: parse, one repair attempt, schema validation with
// defaulting.

use std::sync::Arc;

use crate::application::use_cases::insight_prompt::{
    InsightPromptBuilder, ANSWER_SYSTEM_PROMPT, INSIGHT_SYSTEM_PROMPT,
};
use crate::domain::digest::Digest;
use crate::domain::error::{AppError, Result};
use crate::domain::insight::InsightResult;
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::llm_clients::LLMClient;

const INSIGHT_MAX_TOKENS: u32 = 800;
const ANSWER_MAX_TOKENS: u32 = 300;

pub struct StructuredInsightClient {
    llm: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl StructuredInsightClient {
    pub fn new(llm: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm, config }
    }

    /// Insight mode: prompt the service with the digest and validate the
    /// structured response. Transport failures surface as
    /// `GenerationUnavailable`, contract violations as `MalformedInsight`;
    /// callers degrade to digest/chart-only output on either.
    pub async fn generate_insights(&self, digest: &Digest) -> Result<InsightResult> {
        let prompt = InsightPromptBuilder::build(digest)?;
        let raw = self
            .llm
            .generate(
                &self.config.with_max_tokens(INSIGHT_MAX_TOKENS),
                INSIGHT_SYSTEM_PROMPT,
                &prompt,
            )
            .await?;

        Self::parse_structured(&raw)
    }

    /// Answer mode: ground a follow-up question in pre-assembled context.
    /// The model's answer is returned verbatim, including statements that
    /// the context is insufficient.
    pub async fn answer(&self, question: &str, context: &str) -> Result<String> {
        let prompt = format!(
            r#"Using the provided dataset context, answer the user's question.

Context:
{context}

User Question: {question}

Instructions:
- Answer ONLY using the provided information.
- Do not fabricate columns or values.
- If the answer cannot be determined from the context, state "Insufficient data in the dataset to answer this question."
- Keep the answer professional and concise."#
        );

        let answer = self
            .llm
            .generate(
                &self.config.with_max_tokens(ANSWER_MAX_TOKENS),
                ANSWER_SYSTEM_PROMPT,
                &prompt,
            )
            .await?;

        let answer = answer.trim().to_string();
        if answer.is_empty() {
            return Err(AppError::GenerationUnavailable(
                "Generation service returned an empty completion".to_string(),
            ));
        }
        Ok(answer)
    }

    /// Parse raw completion text into a validated InsightResult.
    /// One repair attempt: strip surrounding code fences and re-parse.
    pub fn parse_structured(raw: &str) -> Result<InsightResult> {
        let trimmed = raw.trim();

        let value = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value) => value,
            Err(_) => {
                let repaired = strip_code_fence(trimmed);
                serde_json::from_str::<serde_json::Value>(&repaired).map_err(|e| {
                    AppError::MalformedInsight(format!(
                        "Generation service returned invalid JSON: {}",
                        e
                    ))
                })?
            }
        };

        InsightResult::from_value(value)
    }
}

fn strip_code_fence(value: &str) -> String {
    let trimmed = value.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    if let Some(stripped) = trimmed.strip_prefix("```") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let result = StructuredInsightClient::parse_structured(
            r#"{"summary": "ok", "trends": ["up"], "outliers": [], "risks": [], "recommendations": []}"#,
        )
        .unwrap();
        assert_eq!(result.summary, "ok");
        assert_eq!(result.trends, vec!["up"]);
    }

    #[test]
    fn test_parse_fenced_json_is_repaired() {
        let raw = "```json\n{\"summary\": \"fenced\", \"risks\": [\"low stock\"]}\n```";
        let result = StructuredInsightClient::parse_structured(raw).unwrap();
        assert_eq!(result.summary, "fenced");
        assert_eq!(result.risks, vec!["low stock"]);
    }

    #[test]
    fn test_parse_bare_fence() {
        let raw = "```\n{\"summary\": \"bare\"}\n```";
        let result = StructuredInsightClient::parse_structured(raw).unwrap();
        assert_eq!(result.summary, "bare");
    }

    #[test]
    fn test_missing_risks_defaults_to_empty() {
        let result = StructuredInsightClient::parse_structured(
            r#"{"summary": "s", "trends": [], "outliers": [], "recommendations": []}"#,
        )
        .unwrap();
        assert!(result.risks.is_empty());
    }

    #[test]
    fn test_unparseable_after_repair_is_malformed() {
        let err =
            StructuredInsightClient::parse_structured("the dataset looks great!").unwrap_err();
        assert!(matches!(err, AppError::MalformedInsight(_)));
    }

    #[test]
    fn test_string_for_list_coerced() {
        let result = StructuredInsightClient::parse_structured(
            r#"{"summary": "s", "trends": "a single trend"}"#,
        )
        .unwrap();
        assert_eq!(result.trends, vec!["a single trend"]);
    }
}

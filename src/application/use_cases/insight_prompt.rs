// ============================================================
// INSIGHT PROMPT BUILDER
// ============================================================
// Deterministic rendering of a digest into the generation
// instruction. Pure function of the digest: same digest, same
// prompt text.

use crate::domain::digest::Digest;
use crate::domain::error::Result;

pub const INSIGHT_SYSTEM_PROMPT: &str =
    "You are a data analyst. Return only valid JSON, no markdown formatting.";

pub const ANSWER_SYSTEM_PROMPT: &str =
    "You are a helpful data analyst. Answer strictly based on the provided data context.";

pub struct InsightPromptBuilder;

impl InsightPromptBuilder {
    /// Render the fixed insight instruction around the digest block
    pub fn build(digest: &Digest) -> Result<String> {
        let digest_block = digest.to_prompt_block()?;

        Ok(format!(
            r#"You are a senior data analyst generating a professional business report.
Analyze this dataset and return ONLY valid JSON (no markdown, no code blocks).

Dataset Summary:
{digest_block}

STRICT INSTRUCTIONS:
1. Use ONLY the computed statistics provided above.
2. Do NOT invent values, counts, or column names.
3. Interpret patterns instead of just ranking values.
4. Avoid generic statements.

Return JSON with this exact structure:
{{
  "summary": "High-level executive summary focused on distribution and variability.",
  "trends": ["Trend 1", "Trend 2"],
  "outliers": ["List specific outliers with values"],
  "risks": ["Potential risks grounded in the data"],
  "recommendations": ["Actionable recommendations"]
}}

Rules:
- If value counts are tied, clearly state they are tied.
- Base all claims strictly on the statistics provided.
- If no outliers/risks are found, return empty arrays."#
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::ingestor::TabularIngestor;
    use crate::application::use_cases::summarizer::Summarizer;

    fn digest() -> Digest {
        let dataset = TabularIngestor::new(5 * 1024 * 1024)
            .ingest("test.csv", b"amount,category\n10,A\n20,B\n30,A")
            .unwrap();
        Summarizer::default_config().summarize(&dataset).unwrap()
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let d = digest();
        assert_eq!(
            InsightPromptBuilder::build(&d).unwrap(),
            InsightPromptBuilder::build(&d).unwrap()
        );
    }

    #[test]
    fn test_prompt_embeds_digest_verbatim() {
        let d = digest();
        let prompt = InsightPromptBuilder::build(&d).unwrap();
        assert!(prompt.contains(&d.to_prompt_block().unwrap()));
    }

    #[test]
    fn test_prompt_names_all_five_fields() {
        let prompt = InsightPromptBuilder::build(&digest()).unwrap();
        for field in ["summary", "trends", "outliers", "risks", "recommendations"] {
            assert!(prompt.contains(&format!("\"{}\"", field)));
        }
    }
}

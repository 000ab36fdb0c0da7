//! Context manager for follow-up questions
//! Grounds each new question in the stored digest plus prior Q&A turns

use crate::domain::conversation::ConversationTurn;
use crate::domain::digest::Digest;
use crate::domain::error::{AppError, Result};
use crate::domain::insight::InsightResult;
use crate::shared::TokenCounter;

pub const MIN_QUESTION_CHARS: usize = 3;
pub const MAX_QUESTION_CHARS: usize = 300;

pub struct ConversationContextManager {
    /// Token budget for the assembled context block
    max_context_tokens: usize,
}

impl Default for ConversationContextManager {
    fn default() -> Self {
        Self {
            max_context_tokens: 3000,
        }
    }
}

impl ConversationContextManager {
    pub fn new(max_context_tokens: usize) -> Self {
        Self { max_context_tokens }
    }

    /// Reject questions outside the accepted length band
    pub fn validate_question(question: &str) -> Result<()> {
        let len = question.trim().chars().count();
        if len < MIN_QUESTION_CHARS {
            return Err(AppError::ValidationError(format!(
                "Question must be at least {} characters",
                MIN_QUESTION_CHARS
            )));
        }
        if len > MAX_QUESTION_CHARS {
            return Err(AppError::ValidationError(format!(
                "Question too long (max {} characters)",
                MAX_QUESTION_CHARS
            )));
        }
        Ok(())
    }

    /// Build the context block: digest, condensed insights, then every prior
    /// Q/A pair oldest to newest. When the history would overflow the token
    /// budget the oldest turns are dropped first; the digest never is.
    pub fn build_context(
        &self,
        digest: &Digest,
        insights: Option<&InsightResult>,
        turns: &[ConversationTurn],
    ) -> Result<String> {
        let mut fixed = format!("Dataset Summary:\n{}\n", digest.to_prompt_block()?);

        if let Some(insights) = insights {
            let condensed = insights.condensed();
            if !condensed.is_empty() {
                fixed.push_str("\nKey Insights:\n");
                fixed.push_str(&condensed);
                fixed.push('\n');
            }
        }

        let kept = self.turns_within_budget(&fixed, turns);

        let mut context = fixed;
        if !kept.is_empty() {
            context.push_str("\nPrevious Q&A:\n");
            for turn in kept {
                context.push_str(&format!("Q: {}\nA: {}\n", turn.question, turn.answer));
            }
        }

        Ok(context)
    }

    /// Walk the history newest to oldest, keeping turns while they fit, then
    /// restore chronological order
    fn turns_within_budget<'a>(
        &self,
        fixed: &str,
        turns: &'a [ConversationTurn],
    ) -> Vec<&'a ConversationTurn> {
        let budget =
            TokenCounter::estimate_remaining(TokenCounter::estimate_tokens(fixed), self.max_context_tokens);

        let mut kept = Vec::new();
        let mut used = 0usize;

        for turn in turns.iter().rev() {
            let rendered = format!("Q: {}\nA: {}\n", turn.question, turn.answer);
            let turn_tokens = TokenCounter::estimate_tokens(&rendered);
            if used + turn_tokens > budget {
                break;
            }
            used += turn_tokens;
            kept.insert(0, turn);
        }

        kept
    }
}

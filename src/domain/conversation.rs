// ============================================================
// CONVERSATION TYPES
// ============================================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One stored follow-up question and its answer, tied to a report.
/// Turns are append-only and read back in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: i64,
    pub report_id: i64,
    pub question: String,
    pub answer: String,
    pub created_at: NaiveDateTime,
}

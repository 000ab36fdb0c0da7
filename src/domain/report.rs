// ============================================================
// REPORT TYPES
// ============================================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::chart::ChartSpec;
use super::digest::Digest;
use super::insight::InsightResult;

/// A stored analysis report: the digest plus whatever the generation
/// step produced. `insights` and `insights_error` are mutually exclusive;
/// `insights_error` is the explicit "insights unavailable" signal, distinct
/// from a normal empty result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub filename: String,
    pub digest: Digest,
    pub insights: Option<InsightResult>,
    pub insights_error: Option<String>,
    pub chart: Option<ChartSpec>,
    pub created_at: NaiveDateTime,
}

/// Listing row for the report index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: i64,
    pub filename: String,
    pub created_at: NaiveDateTime,
}

// ============================================================
// REPORT SERVICE
// ============================================================
// Orchestrates the ingest-to-insight pipeline and the follow-up
// question flow. Each invocation is scoped to one report.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

use crate::application::use_cases::chart_selector::ChartSelector;
use crate::application::use_cases::context_manager::ConversationContextManager;
use crate::application::use_cases::ingestor::TabularIngestor;
use crate::application::use_cases::insight_client::StructuredInsightClient;
use crate::application::use_cases::summarizer::Summarizer;
use crate::domain::chart::ChartSpec;
use crate::domain::conversation::ConversationTurn;
use crate::domain::digest::Digest;
use crate::domain::error::{AppError, Result};
use crate::domain::insight::InsightResult;
use crate::domain::report::{Report, ReportSummary};
use crate::infrastructure::db::{QuestionRepository, ReportRepository};

/// Result of one upload pipeline run. `insights_error` carries the
/// explicit "insights unavailable" signal when generation degraded.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub report_id: i64,
    pub filename: String,
    pub digest: Digest,
    pub chart: Option<ChartSpec>,
    pub insights: Option<InsightResult>,
    pub insights_error: Option<String>,
}

pub struct ReportService {
    ingestor: TabularIngestor,
    summarizer: Summarizer,
    chart_selector: ChartSelector,
    insight_client: StructuredInsightClient,
    context_manager: ConversationContextManager,
    reports: ReportRepository,
    questions: QuestionRepository,
    max_stored_reports: usize,

    /// Per-report mutexes serializing concurrent question submissions
    report_locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl ReportService {
    pub fn new(
        ingestor: TabularIngestor,
        summarizer: Summarizer,
        chart_selector: ChartSelector,
        insight_client: StructuredInsightClient,
        context_manager: ConversationContextManager,
        reports: ReportRepository,
        questions: QuestionRepository,
        max_stored_reports: usize,
    ) -> Self {
        Self {
            ingestor,
            summarizer,
            chart_selector,
            insight_client,
            context_manager,
            reports,
            questions,
            max_stored_reports,
            report_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Upload pipeline: ingest, summarize, select charts, generate insights,
    /// persist. Ingestion failures abort before any digest exists; generation
    /// failures degrade to digest/chart-only output.
    pub async fn analyze_upload(&self, filename: &str, content: &[u8]) -> Result<UploadOutcome> {
        let dataset = self.ingestor.ingest(filename, content)?;
        let digest = self.summarizer.summarize(&dataset)?;
        drop(dataset);

        let chart = self.chart_selector.select(&digest);

        let (insights, insights_error) = match self.insight_client.generate_insights(&digest).await
        {
            Ok(insights) => (Some(insights), None),
            Err(AppError::GenerationUnavailable(msg)) | Err(AppError::MalformedInsight(msg)) => {
                warn!(error = %msg, filename, "Insight generation degraded");
                (None, Some("Insights are currently unavailable".to_string()))
            }
            Err(other) => return Err(other),
        };

        let report_id = self
            .reports
            .insert(
                filename,
                &digest,
                insights.as_ref(),
                insights_error.as_deref(),
                chart.as_ref(),
            )
            .await?;

        let pruned = self.reports.cleanup_old(self.max_stored_reports).await?;
        if pruned > 0 {
            info!(pruned, "Pruned old reports");
        }

        info!(
            report_id,
            filename,
            rows = digest.row_count,
            columns = digest.column_count,
            has_insights = insights.is_some(),
            "Report created"
        );

        Ok(UploadOutcome {
            report_id,
            filename: filename.to_string(),
            digest,
            chart,
            insights,
            insights_error,
        })
    }

    /// Follow-up question flow. The turn is stored only after a successful
    /// answer, so every persisted turn has both a question and a non-empty
    /// answer. Questions on the same report are serialized.
    pub async fn ask(&self, report_id: i64, question: &str) -> Result<ConversationTurn> {
        ConversationContextManager::validate_question(question)?;

        let lock = self.lock_for(report_id);
        let _guard = lock.lock().await;

        let report = self
            .reports
            .get(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

        let turns = self.questions.list_for_report(report_id).await?;
        let context = self.context_manager.build_context(
            &report.digest,
            report.insights.as_ref(),
            &turns,
        )?;

        let answer = self
            .insight_client
            .answer(question.trim(), &context)
            .await?;

        let turn = self
            .questions
            .insert(report_id, question.trim(), &answer)
            .await?;

        info!(report_id, turn_id = turn.id, "Question answered");
        Ok(turn)
    }

    pub async fn get_report(&self, report_id: i64) -> Result<Report> {
        self.reports
            .get(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    pub async fn list_reports(&self) -> Result<Vec<ReportSummary>> {
        self.reports.list().await
    }

    pub async fn delete_report(&self, report_id: i64) -> Result<()> {
        let deleted = self.reports.delete(report_id).await?;
        if !deleted {
            return Err(AppError::NotFound("Report not found".to_string()));
        }
        self.report_locks
            .lock()
            .expect("report lock table poisoned")
            .remove(&report_id);
        Ok(())
    }

    pub async fn list_questions(&self, report_id: i64) -> Result<Vec<ConversationTurn>> {
        // Listing questions for an unknown report is a NotFound, not an
        // empty history
        self.get_report(report_id).await?;
        self.questions.list_for_report(report_id).await
    }

    fn lock_for(&self, report_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .report_locks
            .lock()
            .expect("report lock table poisoned");
        locks
            .entry(report_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::summarizer::SummarizerConfig;
    use crate::domain::llm_config::LLMConfig;
    use crate::infrastructure::db::connection::init_memory_db;
    use crate::infrastructure::llm_clients::LLMClient;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted generation service: returns canned completions and counts
    /// how many calls were made
    struct ScriptedLlm {
        responses: Vec<Result<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }

        fn always(response: &str) -> Self {
            Self::new(vec![Ok(response.to_string())])
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedLlm {
        async fn generate(&self, _: &LLMConfig, _: &str, _: &str) -> Result<String> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(idx.min(self.responses.len().saturating_sub(1)))
                .cloned()
                .unwrap_or_else(|| {
                    Err(AppError::GenerationUnavailable("no scripted response".into()))
                })
        }
    }

    const VALID_INSIGHTS: &str = r#"{"summary": "Values span the full range.", "trends": ["rising"], "outliers": [], "risks": [], "recommendations": ["monitor"]}"#;

    async fn service_with(llm: Arc<ScriptedLlm>) -> ReportService {
        let pool = init_memory_db().await.unwrap();
        ReportService::new(
            TabularIngestor::new(5 * 1024 * 1024),
            Summarizer::new(SummarizerConfig::default()),
            ChartSelector::default(),
            StructuredInsightClient::new(llm, LLMConfig::default()),
            ConversationContextManager::default(),
            ReportRepository::new(pool.clone()),
            QuestionRepository::new(pool),
            5,
        )
    }

    #[tokio::test]
    async fn test_upload_end_to_end() {
        let llm = Arc::new(ScriptedLlm::always(VALID_INSIGHTS));
        let service = service_with(llm.clone()).await;

        let outcome = service
            .analyze_upload("sales.csv", b"amount,category\n10,A\n20,B\n30,A")
            .await
            .unwrap();

        assert_eq!(outcome.digest.row_count, 3);
        assert_eq!(outcome.digest.column_count, 2);
        assert_eq!(
            outcome.digest.columns[0].numeric.as_ref().unwrap().mean,
            20.0
        );
        assert!(outcome.chart.is_some());
        assert_eq!(outcome.insights.as_ref().unwrap().trends, vec!["rising"]);
        assert!(outcome.insights_error.is_none());
        assert_eq!(llm.call_count(), 1);

        let stored = service.get_report(outcome.report_id).await.unwrap();
        assert_eq!(stored.filename, "sales.csv");
        assert!(stored.insights.is_some());
    }

    #[tokio::test]
    async fn test_header_only_upload_aborts_without_generation() {
        let llm = Arc::new(ScriptedLlm::always(VALID_INSIGHTS));
        let service = service_with(llm.clone()).await;

        let err = service
            .analyze_upload("empty.csv", b"a,b,c\n")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyDataset(_)));
        assert_eq!(llm.call_count(), 0);
        assert!(service.list_reports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_to_digest_and_chart() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(AppError::GenerationUnavailable(
            "down".into(),
        ))]));
        let service = service_with(llm).await;

        let outcome = service
            .analyze_upload("sales.csv", b"amount\n1\n2")
            .await
            .unwrap();

        assert!(outcome.insights.is_none());
        assert!(outcome.insights_error.is_some());
        assert!(outcome.chart.is_some());

        // The degraded report is still stored and loadable
        let stored = service.get_report(outcome.report_id).await.unwrap();
        assert!(stored.insights.is_none());
        assert!(stored.insights_error.is_some());
    }

    #[tokio::test]
    async fn test_malformed_insights_degrade_too() {
        let llm = Arc::new(ScriptedLlm::always("not json at all"));
        let service = service_with(llm).await;

        let outcome = service
            .analyze_upload("sales.csv", b"amount\n1\n2")
            .await
            .unwrap();
        assert!(outcome.insights.is_none());
        assert!(outcome.insights_error.is_some());
    }

    #[tokio::test]
    async fn test_short_question_rejected_before_generation() {
        let llm = Arc::new(ScriptedLlm::always(VALID_INSIGHTS));
        let service = service_with(llm.clone()).await;

        let outcome = service
            .analyze_upload("sales.csv", b"amount\n1\n2")
            .await
            .unwrap();
        let calls_after_upload = llm.call_count();

        let err = service.ask(outcome.report_id, "ok").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(llm.call_count(), calls_after_upload);
        assert!(service
            .list_questions(outcome.report_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_report_question() {
        let llm = Arc::new(ScriptedLlm::always(VALID_INSIGHTS));
        let service = service_with(llm).await;

        let err = service.ask(999, "What is the mean?").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_answer_creates_no_turn() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(VALID_INSIGHTS.to_string()),
            Err(AppError::GenerationUnavailable("down".into())),
        ]));
        let service = service_with(llm).await;

        let outcome = service
            .analyze_upload("sales.csv", b"amount\n1\n2")
            .await
            .unwrap();

        let err = service
            .ask(outcome.report_id, "What is the mean?")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationUnavailable(_)));
        assert!(service
            .list_questions(outcome.report_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_n_questions_stored_in_submission_order() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(VALID_INSIGHTS.to_string()),
            Ok("Answer one".to_string()),
            Ok("Answer two".to_string()),
            Ok("Answer three".to_string()),
        ]));
        let service = service_with(llm).await;

        let outcome = service
            .analyze_upload("sales.csv", b"amount\n1\n2")
            .await
            .unwrap();

        for question in ["First question?", "Second question?", "Third question?"] {
            service.ask(outcome.report_id, question).await.unwrap();
        }

        let turns = service.list_questions(outcome.report_id).await.unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].question, "First question?");
        assert_eq!(turns[1].question, "Second question?");
        assert_eq!(turns[2].question, "Third question?");
        assert_eq!(turns[2].answer, "Answer three");
    }

    #[tokio::test]
    async fn test_insufficient_data_answer_is_not_an_error() {
        let insufficient = "Insufficient data in the dataset to answer this question.";
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(VALID_INSIGHTS.to_string()),
            Ok(insufficient.to_string()),
        ]));
        let service = service_with(llm).await;

        let outcome = service
            .analyze_upload("sales.csv", b"amount\n1\n2")
            .await
            .unwrap();
        let turn = service
            .ask(outcome.report_id, "Who is the CEO?")
            .await
            .unwrap();
        assert_eq!(turn.answer, insufficient);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_newest_reports() {
        let llm = Arc::new(ScriptedLlm::always(VALID_INSIGHTS));
        let pool = init_memory_db().await.unwrap();
        let service = ReportService::new(
            TabularIngestor::new(5 * 1024 * 1024),
            Summarizer::new(SummarizerConfig::default()),
            ChartSelector::default(),
            StructuredInsightClient::new(llm, LLMConfig::default()),
            ConversationContextManager::default(),
            ReportRepository::new(pool.clone()),
            QuestionRepository::new(pool),
            2,
        );

        let mut ids = Vec::new();
        for i in 0..4 {
            let outcome = service
                .analyze_upload(&format!("file{}.csv", i), b"amount\n1\n2")
                .await
                .unwrap();
            ids.push(outcome.report_id);
        }

        let remaining = service.list_reports().await.unwrap();
        assert_eq!(remaining.len(), 2);
        let remaining_ids: Vec<i64> = remaining.iter().map(|r| r.id).collect();
        assert!(remaining_ids.contains(&ids[2]));
        assert!(remaining_ids.contains(&ids[3]));
    }

    #[tokio::test]
    async fn test_delete_report() {
        let llm = Arc::new(ScriptedLlm::always(VALID_INSIGHTS));
        let service = service_with(llm).await;

        let outcome = service
            .analyze_upload("sales.csv", b"amount\n1\n2")
            .await
            .unwrap();
        service.delete_report(outcome.report_id).await.unwrap();

        let err = service.get_report(outcome.report_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.delete_report(outcome.report_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

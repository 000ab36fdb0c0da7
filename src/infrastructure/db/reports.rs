use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::domain::chart::ChartSpec;
use crate::domain::digest::Digest;
use crate::domain::error::{AppError, Result};
use crate::domain::insight::InsightResult;
use crate::domain::report::{Report, ReportSummary};

/// Persistence for analysis reports. Digest, insights, and chart payloads
/// are stored as JSON text columns.
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        filename: &str,
        digest: &Digest,
        insights: Option<&InsightResult>,
        insights_error: Option<&str>,
        chart: Option<&ChartSpec>,
    ) -> Result<i64> {
        let summary_data = to_json(digest)?;
        let insights_json = insights.map(to_json).transpose()?;
        let chart_data = chart.map(to_json).transpose()?;

        let sql = r#"
            INSERT INTO reports (filename, summary_data, insights_json, insights_error, chart_data)
            VALUES (?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(sql)
            .bind(filename)
            .bind(summary_data)
            .bind(insights_json)
            .bind(insights_error)
            .bind(chart_data)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to store report: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, report_id: i64) -> Result<Option<Report>> {
        let sql = r#"
            SELECT id, filename, summary_data, insights_json, insights_error, chart_data, created_at
            FROM reports
            WHERE id = ?
        "#;

        let row: Option<(
            i64,
            String,
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            NaiveDateTime,
        )> = sqlx::query_as(sql)
            .bind(report_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to load report: {}", e)))?;

        row.map(
            |(id, filename, summary_data, insights_json, insights_error, chart_data, created_at)| {
                Ok(Report {
                    id,
                    filename,
                    digest: from_json(&summary_data)?,
                    insights: insights_json.as_deref().map(from_json).transpose()?,
                    insights_error,
                    chart: chart_data.as_deref().map(from_json).transpose()?,
                    created_at,
                })
            },
        )
        .transpose()
    }

    /// All reports, newest first
    pub async fn list(&self) -> Result<Vec<ReportSummary>> {
        let sql = r#"
            SELECT id, filename, created_at
            FROM reports
            ORDER BY created_at DESC, id DESC
        "#;

        let rows: Vec<(i64, String, NaiveDateTime)> = sqlx::query_as(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list reports: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(id, filename, created_at)| ReportSummary {
                id,
                filename,
                created_at,
            })
            .collect())
    }

    pub async fn delete(&self, report_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = ?")
            .bind(report_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete report: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete old reports, keeping only the most recent ones.
    /// Returns the number of pruned rows.
    pub async fn cleanup_old(&self, max_reports: usize) -> Result<u64> {
        let sql = r#"
            DELETE FROM reports
            WHERE id NOT IN (
                SELECT id FROM reports ORDER BY created_at DESC, id DESC LIMIT ?
            )
        "#;

        let result = sqlx::query(sql)
            .bind(max_reports as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to prune reports: {}", e)))?;

        Ok(result.rows_affected())
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Result<String> {
    serde_json::to_string(&value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize report payload: {}", e)))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::DatabaseError(format!("Corrupt report payload: {}", e)))
}

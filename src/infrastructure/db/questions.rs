use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::domain::conversation::ConversationTurn;
use crate::domain::error::{AppError, Result};

/// Persistence for the append-only Q&A log of a report
pub struct QuestionRepository {
    pool: SqlitePool,
}

impl QuestionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        report_id: i64,
        question: &str,
        answer: &str,
    ) -> Result<ConversationTurn> {
        let sql = r#"
            INSERT INTO report_questions (report_id, question, answer)
            VALUES (?, ?, ?)
        "#;

        let result = sqlx::query(sql)
            .bind(report_id)
            .bind(question)
            .bind(answer)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to store question: {}", e)))?;

        let id = result.last_insert_rowid();

        let row: (NaiveDateTime,) =
            sqlx::query_as("SELECT created_at FROM report_questions WHERE id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to read back question: {}", e))
                })?;

        Ok(ConversationTurn {
            id,
            report_id,
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: row.0,
        })
    }

    /// Turn history in chronological order
    pub async fn list_for_report(&self, report_id: i64) -> Result<Vec<ConversationTurn>> {
        let sql = r#"
            SELECT id, report_id, question, answer, created_at
            FROM report_questions
            WHERE report_id = ?
            ORDER BY created_at ASC, id ASC
        "#;

        let rows: Vec<(i64, i64, String, String, NaiveDateTime)> = sqlx::query_as(sql)
            .bind(report_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to load questions: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, report_id, question, answer, created_at)| ConversationTurn {
                    id,
                    report_id,
                    question,
                    answer,
                    created_at,
                },
            )
            .collect())
    }
}

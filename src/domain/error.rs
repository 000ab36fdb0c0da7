use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppError {
    /// Content is not decodable or not parseable as delimited text.
    Format(String),
    /// No data rows remain after parsing.
    EmptyDataset(String),
    /// Raw content exceeds the configured byte ceiling.
    SizeLimit(String),
    /// The generation service timed out or failed at the transport level.
    GenerationUnavailable(String),
    /// The generation service returned output that violates the insight contract.
    MalformedInsight(String),
    ValidationError(String),
    NotFound(String),
    DatabaseError(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Format(msg) => write!(f, "Format error: {}", msg),
            AppError::EmptyDataset(msg) => write!(f, "Empty dataset: {}", msg),
            AppError::SizeLimit(msg) => write!(f, "Size limit exceeded: {}", msg),
            AppError::GenerationUnavailable(msg) => write!(f, "Generation unavailable: {}", msg),
            AppError::MalformedInsight(msg) => write!(f, "Malformed insight output: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

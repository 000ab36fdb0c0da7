// ============================================================
// DIGEST TYPES
// ============================================================
// Durable statistical summary of a dataset, sized to fit a
// generation prompt budget

use serde::{Deserialize, Serialize};

use super::dataset::ColumnType;
use super::error::{AppError, Result};

/// Descriptive statistics for a numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub null_count: usize,
}

/// One entry of a categorical column's top-value frequency list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopValue {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDigest {
    pub name: String,
    pub column_type: ColumnType,
    pub null_count: usize,
    pub distinct_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_values: Vec<TopValue>,
}

/// Bounded statistical summary of one uploaded dataset.
///
/// Columns keep declaration order; sample rows keep original row order and
/// are aligned with `sample_columns`. Serialization is deterministic, which
/// makes the prompt built from a digest deterministic too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnDigest>,
    pub sample_columns: Vec<String>,
    pub sample_rows: Vec<Vec<Option<String>>>,
}

impl Digest {
    /// Byte length of the JSON form, the size the prompt budget is charged for.
    pub fn serialized_len(&self) -> Result<usize> {
        let json = serde_json::to_string(self)
            .map_err(|e| AppError::Internal(format!("Failed to serialize digest: {}", e)))?;
        Ok(json.len())
    }

    /// Pretty JSON block embedded verbatim into prompts.
    pub fn to_prompt_block(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Internal(format!("Failed to serialize digest: {}", e)))
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnDigest> {
        self.columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Numeric && c.numeric.is_some())
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &ColumnDigest> {
        self.columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Categorical)
    }

    /// Index of a sample column by name
    pub fn sample_column_index(&self, name: &str) -> Option<usize> {
        self.sample_columns.iter().position(|c| c == name)
    }
}

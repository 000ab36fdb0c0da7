// ============================================================
// DATASET TYPES
// ============================================================
// In-memory table produced by ingestion, discarded after the
// digest is computed

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Inferred type of a single column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Datetime,
    Unknown,
}

/// A single column with its values in original row order.
/// `None` marks a null (empty) cell.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub values: Vec<Option<String>>,
}

/// Ephemeral column-major table. Column names are unique
/// (duplicates are disambiguated at ingestion).
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub row_count: usize,
}

impl Dataset {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// First `limit` rows in original order, row-major.
    pub fn sample_rows(&self, limit: usize, column_limit: usize) -> Vec<Vec<Option<String>>> {
        let take = limit.min(self.row_count);
        let cols = column_limit.min(self.columns.len());
        (0..take)
            .map(|row| {
                self.columns[..cols]
                    .iter()
                    .map(|c| c.values.get(row).cloned().flatten())
                    .collect()
            })
            .collect()
    }
}

static DATETIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // ISO dates, optionally with a time part
        Regex::new(r"^\d{4}-\d{2}-\d{2}([ T]\d{2}:\d{2}(:\d{2})?)?$").unwrap(),
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}$").unwrap(),
    ]
});

/// Check if a string value is numeric
pub fn is_numeric_value(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }

    trimmed.parse::<f64>().is_ok() || trimmed.replace(',', "").parse::<f64>().is_ok()
}

/// Parse a cell as a number, tolerating thousands separators
pub fn parse_numeric_value(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .or_else(|_| trimmed.replace(',', "").parse::<f64>())
        .ok()
}

pub fn is_datetime_value(value: &str) -> bool {
    let trimmed = value.trim();
    DATETIME_PATTERNS.iter().any(|re| re.is_match(trimmed))
}

/// Infer a column's type from its non-null values.
/// Numeric only when every non-null value parses as a number;
/// mixed content falls back to categorical.
pub fn infer_column_type(values: &[Option<String>]) -> ColumnType {
    let non_null: Vec<&String> = values.iter().flatten().collect();
    if non_null.is_empty() {
        return ColumnType::Unknown;
    }
    if non_null.iter().all(|v| is_numeric_value(v)) {
        return ColumnType::Numeric;
    }
    if non_null.iter().all(|v| is_datetime_value(v)) {
        return ColumnType::Datetime;
    }
    ColumnType::Categorical
}

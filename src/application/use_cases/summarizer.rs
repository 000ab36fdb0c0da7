// ============================================================
// SUMMARIZER
// ============================================================
// Deterministic Dataset -> Digest reduction under a serialized
// size budget

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::dataset::{parse_numeric_value, ColumnType, Dataset};
use crate::domain::digest::{ColumnDigest, Digest, NumericStats, TopValue};
use crate::domain::error::{AppError, Result};

/// Configuration for digest computation and truncation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Serialized digest size ceiling in bytes
    pub max_digest_bytes: usize,

    /// Row sample cap (rows kept in original order)
    pub sample_row_cap: usize,

    /// Top-value entries computed per categorical column
    pub top_k: usize,

    /// Top-value entries kept once the digest is over budget
    pub top_k_floor: usize,

    /// Maximum columns carried in the sample and categorical sections
    pub max_digest_columns: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_digest_bytes: 6000,
            sample_row_cap: 20,
            top_k: 10,
            top_k_floor: 5,
            max_digest_columns: 40,
        }
    }
}

impl SummarizerConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_digest_bytes == 0 {
            return Err("max_digest_bytes must be > 0".to_string());
        }
        if self.top_k_floor > self.top_k {
            return Err("top_k_floor must be <= top_k".to_string());
        }
        if self.max_digest_columns == 0 {
            return Err("max_digest_columns must be > 0".to_string());
        }
        Ok(())
    }
}

/// Digest computation. Given the same Dataset the output is byte-for-byte
/// identical: no sampling randomness, no timestamps, stable tie-breaking.
pub struct Summarizer {
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(config: SummarizerConfig) -> Self {
        Self { config }
    }

    pub fn default_config() -> Self {
        Self::new(SummarizerConfig::default())
    }

    /// Compute the digest, truncating until it fits the size budget.
    ///
    /// Truncation order: categorical top-K lists shrink to the floor first,
    /// then the row sample halves down to zero, then categorical column
    /// digests drop from the end. Numeric statistics are never dropped.
    pub fn summarize(&self, dataset: &Dataset) -> Result<Digest> {
        self.config
            .validate()
            .map_err(|e| AppError::Internal(format!("Invalid summarizer config: {}", e)))?;

        let mut digest = self.build_digest(dataset);

        if digest.serialized_len()? <= self.config.max_digest_bytes {
            return Ok(digest);
        }

        // Pass 1: shrink top-value lists
        for column in &mut digest.columns {
            column.top_values.truncate(self.config.top_k_floor);
        }
        if digest.serialized_len()? <= self.config.max_digest_bytes {
            return Ok(digest);
        }

        // Pass 2: halve the row sample until it fits or is gone
        while !digest.sample_rows.is_empty()
            && digest.serialized_len()? > self.config.max_digest_bytes
        {
            let keep = digest.sample_rows.len() / 2;
            digest.sample_rows.truncate(keep);
        }
        if digest.sample_rows.is_empty() {
            digest.sample_columns.clear();
        }
        if digest.serialized_len()? <= self.config.max_digest_bytes {
            return Ok(digest);
        }

        // Pass 3 (last resort): enforce the column cap, then keep dropping
        // trailing non-numeric digests while over budget. Numeric statistics
        // survive for every column.
        while digest.columns.len() > self.config.max_digest_columns
            || digest.serialized_len()? > self.config.max_digest_bytes
        {
            let last_non_numeric = digest
                .columns
                .iter()
                .rposition(|c| c.column_type != ColumnType::Numeric);
            match last_non_numeric {
                Some(idx) => {
                    digest.columns.remove(idx);
                }
                None => break,
            }
        }

        Ok(digest)
    }

    fn build_digest(&self, dataset: &Dataset) -> Digest {
        let columns = dataset
            .columns
            .iter()
            .map(|column| {
                let null_count = column.values.iter().filter(|v| v.is_none()).count();
                match column.column_type {
                    ColumnType::Numeric => ColumnDigest {
                        name: column.name.clone(),
                        column_type: column.column_type,
                        null_count,
                        distinct_count: distinct_count(&column.values),
                        numeric: numeric_stats(&column.values, null_count),
                        top_values: Vec::new(),
                    },
                    ColumnType::Categorical => ColumnDigest {
                        name: column.name.clone(),
                        column_type: column.column_type,
                        null_count,
                        distinct_count: distinct_count(&column.values),
                        numeric: None,
                        top_values: top_values(&column.values, self.config.top_k),
                    },
                    ColumnType::Datetime | ColumnType::Unknown => ColumnDigest {
                        name: column.name.clone(),
                        column_type: column.column_type,
                        null_count,
                        distinct_count: distinct_count(&column.values),
                        numeric: None,
                        top_values: Vec::new(),
                    },
                }
            })
            .collect();

        let column_cap = self.config.max_digest_columns;
        let sample_columns = dataset
            .columns
            .iter()
            .take(column_cap)
            .map(|c| c.name.clone())
            .collect();

        Digest {
            row_count: dataset.row_count,
            column_count: dataset.column_count(),
            columns,
            sample_columns,
            sample_rows: dataset.sample_rows(self.config.sample_row_cap, column_cap),
        }
    }
}

fn numeric_stats(values: &[Option<String>], null_count: usize) -> Option<NumericStats> {
    let parsed: Vec<f64> = values
        .iter()
        .flatten()
        .filter_map(|v| parse_numeric_value(v))
        .collect();
    if parsed.is_empty() {
        return None;
    }

    let sum: f64 = parsed.iter().sum();
    let min = parsed.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = parsed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    Some(NumericStats {
        mean: sum / parsed.len() as f64,
        min,
        max,
        null_count,
    })
}

fn distinct_count(values: &[Option<String>]) -> usize {
    let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
    for value in values.iter().flatten() {
        seen.insert(value.as_str());
    }
    seen.len()
}

/// Top-K most frequent values, counts descending, value ascending on ties
fn top_values(values: &[Option<String>], k: usize) -> Vec<TopValue> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    let mut entries: Vec<(&str, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(k)
        .map(|(value, count)| TopValue {
            value: value.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::ingestor::TabularIngestor;

    fn ingest(content: &[u8]) -> Dataset {
        TabularIngestor::new(5 * 1024 * 1024)
            .ingest("test.csv", content)
            .unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let dataset = ingest(b"amount,category\n10,A\n20,B\n30,A");
        let digest = Summarizer::default_config().summarize(&dataset).unwrap();

        assert_eq!(digest.row_count, 3);
        assert_eq!(digest.column_count, 2);

        let amount = &digest.columns[0];
        let stats = amount.numeric.as_ref().unwrap();
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.null_count, 0);

        let category = &digest.columns[1];
        assert_eq!(category.top_values[0].value, "A");
        assert_eq!(category.top_values[0].count, 2);
        assert_eq!(category.distinct_count, 2);
    }

    #[test]
    fn test_determinism() {
        let content = b"amount,category,city\n10,A,NYC\n20,B,LA\n30,A,NYC\n5,C,SF";
        let a = Summarizer::default_config()
            .summarize(&ingest(content))
            .unwrap();
        let b = Summarizer::default_config()
            .summarize(&ingest(content))
            .unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_top_value_tie_breaking_is_stable() {
        let values: Vec<Option<String>> = ["b", "a", "b", "a", "c"]
            .iter()
            .map(|v| Some(v.to_string()))
            .collect();
        let top = top_values(&values, 3);
        assert_eq!(top[0].value, "a");
        assert_eq!(top[1].value, "b");
        assert_eq!(top[2].value, "c");
    }

    #[test]
    fn test_null_counting() {
        let dataset = ingest(b"n\n1\n\n3");
        let digest = Summarizer::default_config().summarize(&dataset).unwrap();
        assert_eq!(digest.columns[0].null_count, 1);
        assert_eq!(digest.columns[0].numeric.as_ref().unwrap().mean, 2.0);
    }

    #[test]
    fn test_sample_capped_and_ordered() {
        let mut content = String::from("n\n");
        for i in 0..50 {
            content.push_str(&format!("{}\n", i));
        }
        let dataset = ingest(content.as_bytes());
        let digest = Summarizer::default_config().summarize(&dataset).unwrap();

        assert_eq!(digest.sample_rows.len(), 20);
        assert_eq!(digest.sample_rows[0][0].as_deref(), Some("0"));
        assert_eq!(digest.sample_rows[19][0].as_deref(), Some("19"));
    }

    #[test]
    fn test_budget_enforced_on_wide_input() {
        // Long categorical values force every truncation pass to run
        let mut content = String::from("num,text\n");
        for i in 0..200 {
            content.push_str(&format!("{},verbose-category-value-{:04}\n", i, i));
        }
        let dataset = ingest(content.as_bytes());

        let config = SummarizerConfig {
            max_digest_bytes: 900,
            ..Default::default()
        };
        let digest = Summarizer::new(config).summarize(&dataset).unwrap();

        assert!(digest.serialized_len().unwrap() <= 900);
        // Numeric statistics survive every pass
        assert!(digest.columns.iter().any(|c| c.numeric.is_some()));
        // Original shape is still reported
        assert_eq!(digest.row_count, 200);
        assert_eq!(digest.column_count, 2);
    }

    #[test]
    fn test_budget_holds_for_minimal_input() {
        let dataset = ingest(b"x\n1");
        let digest = Summarizer::default_config().summarize(&dataset).unwrap();
        assert!(digest.serialized_len().unwrap() <= SummarizerConfig::default().max_digest_bytes);
    }

    #[test]
    fn test_categorical_truncated_before_sample() {
        let mut content = String::from("num,text\n");
        for i in 0..60 {
            content.push_str(&format!("{},distinct-value-number-{:03}\n", i, i));
        }
        let dataset = ingest(content.as_bytes());

        // Budget low enough to trigger pass 1 but generous enough that the
        // sample survives after top-K shrinking plus sample halving
        let config = SummarizerConfig {
            max_digest_bytes: 1200,
            ..Default::default()
        };
        let digest = Summarizer::new(config).summarize(&dataset).unwrap();

        let text = digest
            .columns
            .iter()
            .find(|c| c.name == "text")
            .expect("categorical column kept");
        assert!(text.top_values.len() <= 5);
        assert!(!digest.sample_rows.is_empty());
        assert!(digest.serialized_len().unwrap() <= 1200);
    }
}

// ============================================================
// TABULAR INGESTOR
// ============================================================
// Parse raw upload bytes into a Dataset with encoding detection
// and defensive validation

use csv::{ReaderBuilder, Trim};

use crate::domain::dataset::{infer_column_type, Column, Dataset};
use crate::domain::error::{AppError, Result};

/// CSV ingestor with encoding detection.
///
/// Validation order: extension, non-empty content, byte ceiling, decode,
/// parse. Ingestion has no side effects beyond reading the provided bytes.
pub struct TabularIngestor {
    /// Maximum allowed raw content size in bytes
    max_bytes: usize,
}

impl TabularIngestor {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Parse uploaded bytes into a Dataset
    pub fn ingest(&self, filename: &str, content: &[u8]) -> Result<Dataset> {
        if !has_csv_extension(filename) {
            return Err(AppError::Format(
                "Invalid file type. Only CSV files are allowed".to_string(),
            ));
        }

        if content.is_empty() {
            return Err(AppError::EmptyDataset("Uploaded file is empty".to_string()));
        }

        if content.len() > self.max_bytes {
            return Err(AppError::SizeLimit(format!(
                "File too large. Maximum size is {}MB",
                self.max_bytes / (1024 * 1024)
            )));
        }

        let text = decode_content(content);
        let delimiter = detect_delimiter(&text);
        self.parse_text(&text, delimiter)
    }

    fn parse_text(&self, text: &str, delimiter: u8) -> Result<Dataset> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|_| AppError::Format("Malformed CSV file. Please check formatting".to_string()))?
            .clone();

        if headers.is_empty() {
            return Err(AppError::Format("CSV file has no columns".to_string()));
        }

        let names = disambiguate_headers(headers.iter());

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        let mut row_count = 0usize;

        for record in reader.records() {
            // Ragged rows surface here; the reader is strict about field counts
            let record = record.map_err(|_| {
                AppError::Format("Malformed CSV file. Please check formatting".to_string())
            })?;

            for (idx, column) in columns.iter_mut().enumerate() {
                let value = record.get(idx).unwrap_or("").trim();
                column.push(if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                });
            }
            row_count += 1;
        }

        if row_count == 0 {
            return Err(AppError::EmptyDataset(
                "Dataset contains headers but no data rows".to_string(),
            ));
        }

        let columns = names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| {
                let column_type = infer_column_type(&values);
                Column {
                    name,
                    column_type,
                    values,
                }
            })
            .collect();

        Ok(Dataset { columns, row_count })
    }
}

fn has_csv_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Decode with a prioritized encoding list: strict UTF-8 first, then
/// WINDOWS-1252 (superset of Latin-1, never fails on single bytes).
fn decode_content(content: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(content) {
        return text.to_string();
    }
    let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(content);
    decoded.into_owned()
}

/// Normalize headers: blank names become positional, duplicates are
/// disambiguated with an occurrence suffix rather than dropped.
fn disambiguate_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    headers
        .enumerate()
        .map(|(idx, raw)| {
            let base = {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    format!("column_{}", idx + 1)
                } else {
                    trimmed.to_string()
                }
            };
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{}_{}", base, *count)
            }
        })
        .collect()
}

/// Detect delimiter from content (comma, semicolon, tab, pipe) by scoring
/// per-line counts for frequency and consistency
fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample_lines: Vec<_> = content.lines().take(10).collect();

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &candidates {
        if sample_lines.is_empty() {
            continue;
        }

        let field_counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
        let variance = field_counts
            .iter()
            .map(|&x| (x as f32 - avg).powi(2))
            .sum::<f32>()
            / field_counts.len() as f32;

        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::ColumnType;

    fn ingestor() -> TabularIngestor {
        TabularIngestor::new(5 * 1024 * 1024)
    }

    #[test]
    fn test_ingest_simple_csv() {
        let dataset = ingestor()
            .ingest("sales.csv", b"product,amount\nWidget,10\nGadget,20")
            .unwrap();

        assert_eq!(dataset.row_count, 2);
        assert_eq!(dataset.column_count(), 2);
        assert_eq!(dataset.columns[0].name, "product");
        assert_eq!(dataset.columns[0].column_type, ColumnType::Categorical);
        assert_eq!(dataset.columns[1].column_type, ColumnType::Numeric);
    }

    #[test]
    fn test_rejects_non_csv_extension() {
        let err = ingestor().ingest("report.pdf", b"a,b\n1,2").unwrap_err();
        assert!(matches!(err, AppError::Format(_)));
    }

    #[test]
    fn test_empty_content() {
        let err = ingestor().ingest("empty.csv", b"").unwrap_err();
        assert!(matches!(err, AppError::EmptyDataset(_)));
    }

    #[test]
    fn test_header_only_file() {
        let err = ingestor().ingest("headers.csv", b"a,b,c\n").unwrap_err();
        assert!(matches!(err, AppError::EmptyDataset(_)));
    }

    #[test]
    fn test_size_ceiling() {
        let small = TabularIngestor::new(8);
        let err = small.ingest("big.csv", b"a,b\n1,2\n3,4").unwrap_err();
        assert!(matches!(err, AppError::SizeLimit(_)));
    }

    #[test]
    fn test_ragged_row_is_format_error() {
        let err = ingestor().ingest("bad.csv", b"a,b\n1,2\n3,4,5").unwrap_err();
        assert!(matches!(err, AppError::Format(_)));
    }

    #[test]
    fn test_duplicate_headers_disambiguated() {
        let dataset = ingestor()
            .ingest("dup.csv", b"price,price,name\n1,2,x")
            .unwrap();
        let names: Vec<_> = dataset.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["price", "price_2", "name"]);
    }

    #[test]
    fn test_blank_header_gets_positional_name() {
        let dataset = ingestor().ingest("blank.csv", b"a,,c\n1,2,3").unwrap();
        assert_eq!(dataset.columns[1].name, "column_2");
    }

    #[test]
    fn test_latin1_fallback_decoding() {
        // "café,1" with 0xE9 is invalid UTF-8 but valid WINDOWS-1252
        let bytes = b"name,n\ncaf\xe9,1";
        let dataset = ingestor().ingest("latin.csv", bytes).unwrap();
        assert_eq!(dataset.columns[0].values[0].as_deref(), Some("café"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(detect_delimiter("a|b|c\nd|e|f"), b'|');
    }

    #[test]
    fn test_semicolon_csv_parses() {
        let dataset = ingestor()
            .ingest("semi.csv", b"x;y\n1;2\n3;4")
            .unwrap();
        assert_eq!(dataset.column_count(), 2);
        assert_eq!(dataset.row_count, 2);
    }

    #[test]
    fn test_empty_cells_become_nulls() {
        let dataset = ingestor().ingest("nulls.csv", b"a,b\n1,\n,2").unwrap();
        assert_eq!(dataset.columns[0].values, vec![Some("1".to_string()), None]);
        assert_eq!(dataset.columns[1].values, vec![None, Some("2".to_string())]);
    }
}

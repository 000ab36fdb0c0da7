// ============================================================
// EXPORT SERVICE
// ============================================================
// Plaintext rendering of a stored report for download

use crate::domain::report::Report;

const BANNER: &str = "============================================================";
const RULE: &str = "------------------------------------------------------------";

pub struct ExportService;

impl ExportService {
    /// Render a report as a formatted plain text document.
    /// Sections without content are omitted.
    pub fn generate_text_report(report: &Report) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push(BANNER.to_string());
        lines.push("CSV INSIGHTS REPORT".to_string());
        lines.push(BANNER.to_string());
        lines.push(format!("File: {}", report.filename));
        lines.push(format!(
            "Rows: {}  Columns: {}",
            report.digest.row_count, report.digest.column_count
        ));
        lines.push(String::new());

        match &report.insights {
            Some(insights) => {
                if !insights.summary.is_empty() {
                    lines.push("EXECUTIVE SUMMARY".to_string());
                    lines.push(RULE.to_string());
                    lines.push(insights.summary.clone());
                    lines.push(String::new());
                }

                for (heading, items) in [
                    ("KEY TRENDS", &insights.trends),
                    ("OUTLIERS DETECTED", &insights.outliers),
                    ("RISKS", &insights.risks),
                    ("RECOMMENDATIONS", &insights.recommendations),
                ] {
                    if items.is_empty() {
                        continue;
                    }
                    lines.push(heading.to_string());
                    lines.push(RULE.to_string());
                    for (i, item) in items.iter().enumerate() {
                        lines.push(format!("{}. {}", i + 1, item));
                    }
                    lines.push(String::new());
                }
            }
            None => {
                lines.push("INSIGHTS".to_string());
                lines.push(RULE.to_string());
                lines.push(
                    report
                        .insights_error
                        .clone()
                        .unwrap_or_else(|| "Insights are currently unavailable".to_string()),
                );
                lines.push(String::new());
            }
        }

        lines.push(BANNER.to_string());
        lines.push("End of Report".to_string());
        lines.push(BANNER.to_string());

        lines.join("\n")
    }

    /// Download filename derived from the uploaded file's stem
    pub fn download_filename(uploaded: &str) -> String {
        let stem = uploaded
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(uploaded);
        format!("{}_report.txt", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::digest::Digest;
    use crate::domain::insight::InsightResult;
    use chrono::NaiveDate;

    fn report(insights: Option<InsightResult>, insights_error: Option<String>) -> Report {
        Report {
            id: 1,
            filename: "sales.csv".to_string(),
            digest: Digest {
                row_count: 3,
                column_count: 2,
                columns: vec![],
                sample_columns: vec![],
                sample_rows: vec![],
            },
            insights,
            insights_error,
            chart: None,
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_full_report_sections() {
        let insights = InsightResult {
            summary: "Broad spread.".to_string(),
            trends: vec!["Rising".to_string()],
            outliers: vec![],
            risks: vec!["Low stock".to_string()],
            recommendations: vec!["Restock".to_string()],
        };
        let text = ExportService::generate_text_report(&report(Some(insights), None));

        assert!(text.contains("CSV INSIGHTS REPORT"));
        assert!(text.contains("File: sales.csv"));
        assert!(text.contains("EXECUTIVE SUMMARY"));
        assert!(text.contains("1. Rising"));
        assert!(text.contains("RISKS"));
        // Empty sections are omitted
        assert!(!text.contains("OUTLIERS DETECTED"));
        assert!(text.contains("End of Report"));
    }

    #[test]
    fn test_degraded_report_shows_unavailable_marker() {
        let text = ExportService::generate_text_report(&report(
            None,
            Some("Insights are currently unavailable".to_string()),
        ));
        assert!(text.contains("Insights are currently unavailable"));
        assert!(!text.contains("EXECUTIVE SUMMARY"));
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            ExportService::download_filename("sales.csv"),
            "sales_report.txt"
        );
        assert_eq!(ExportService::download_filename("data"), "data_report.txt");
    }
}

// ============================================================
// CHART TYPES
// ============================================================

use serde::{Deserialize, Serialize};

/// One label/value series ready for the chart-rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub title: String,
}

/// Heuristically derived chart data for a digest with numeric columns.
/// Absent entirely (the selector returns `None`) when no numeric column
/// exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub primary_column: String,
    pub bar_chart: ChartSeries,
    pub histogram: ChartSeries,
}

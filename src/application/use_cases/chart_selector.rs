// ============================================================
// CHART SELECTOR
// ============================================================
// Heuristic chart series derivation from a digest. Best-effort:
// never an error, None when there is nothing numeric to plot.

use std::collections::HashMap;

use crate::domain::chart::{ChartSeries, ChartSpec};
use crate::domain::dataset::parse_numeric_value;
use crate::domain::digest::{ColumnDigest, Digest};

pub struct ChartSelector {
    /// Equal-width histogram bucket count
    bins: usize,

    /// Bar count cap for legibility
    max_bars: usize,
}

impl Default for ChartSelector {
    fn default() -> Self {
        Self {
            bins: 10,
            max_bars: 10,
        }
    }
}

impl ChartSelector {
    pub fn new(bins: usize, max_bars: usize) -> Self {
        Self { bins, max_bars }
    }

    /// Pick the primary column pair and derive both series.
    /// Returns `None` exactly when the digest has no numeric column.
    pub fn select(&self, digest: &Digest) -> Option<ChartSpec> {
        let numeric = digest.numeric_columns().next()?;
        let categorical = self.pick_categorical(digest);

        Some(ChartSpec {
            primary_column: numeric.name.clone(),
            bar_chart: self.bar_series(digest, numeric, categorical),
            histogram: self.histogram_series(digest, numeric),
        })
    }

    /// Fewest distinct values wins; ties resolve by declaration order
    fn pick_categorical<'a>(&self, digest: &'a Digest) -> Option<&'a ColumnDigest> {
        digest
            .categorical_columns()
            .min_by_key(|c| c.distinct_count)
    }

    /// Per-category sum of the primary numeric column over the sample rows.
    /// Without a categorical column, falls back to row-indexed sample values.
    fn bar_series(
        &self,
        digest: &Digest,
        numeric: &ColumnDigest,
        categorical: Option<&ColumnDigest>,
    ) -> ChartSeries {
        let numeric_idx = digest.sample_column_index(&numeric.name);

        if let (Some(cat), Some(num_idx)) = (categorical, numeric_idx) {
            if let Some(cat_idx) = digest.sample_column_index(&cat.name) {
                let mut order: Vec<String> = Vec::new();
                let mut sums: HashMap<String, f64> = HashMap::new();

                for row in &digest.sample_rows {
                    let label = match row.get(cat_idx).and_then(|v| v.as_deref()) {
                        Some(label) => label.to_string(),
                        None => continue,
                    };
                    let value = row
                        .get(num_idx)
                        .and_then(|v| v.as_deref())
                        .and_then(parse_numeric_value);
                    let Some(value) = value else { continue };

                    if !sums.contains_key(&label) {
                        order.push(label.clone());
                    }
                    *sums.entry(label).or_insert(0.0) += value;
                }

                order.truncate(self.max_bars);
                let values = order.iter().map(|label| sums[label]).collect();
                return ChartSeries {
                    labels: order,
                    values,
                    title: format!("{} by {}", numeric.name, cat.name),
                };
            }
        }

        // No categorical column: plot the sample values directly
        let mut labels = Vec::new();
        let mut values = Vec::new();
        if let Some(num_idx) = numeric_idx {
            for (i, row) in digest.sample_rows.iter().take(self.max_bars).enumerate() {
                if let Some(value) = row
                    .get(num_idx)
                    .and_then(|v| v.as_deref())
                    .and_then(parse_numeric_value)
                {
                    labels.push(format!("Row {}", i + 1));
                    values.push(value);
                }
            }
        }
        ChartSeries {
            labels,
            values,
            title: format!("{} - Sample Values", numeric.name),
        }
    }

    /// Equal-width bins over the column's full [min, max] range, counting
    /// sample values. A constant column collapses to a single bin.
    fn histogram_series(&self, digest: &Digest, numeric: &ColumnDigest) -> ChartSeries {
        let stats = match &numeric.numeric {
            Some(stats) => stats,
            None => {
                return ChartSeries {
                    labels: Vec::new(),
                    values: Vec::new(),
                    title: format!("{} Distribution", numeric.name),
                }
            }
        };

        let sample_values: Vec<f64> = digest
            .sample_column_index(&numeric.name)
            .map(|idx| {
                digest
                    .sample_rows
                    .iter()
                    .filter_map(|row| row.get(idx).and_then(|v| v.as_deref()))
                    .filter_map(parse_numeric_value)
                    .collect()
            })
            .unwrap_or_default();

        if stats.max == stats.min {
            return ChartSeries {
                labels: vec![format!("{:.1}", stats.min)],
                values: vec![sample_values.len() as f64],
                title: format!("{} Distribution", numeric.name),
            };
        }

        let width = (stats.max - stats.min) / self.bins as f64;
        let mut labels = Vec::with_capacity(self.bins);
        let mut counts = vec![0usize; self.bins];

        for i in 0..self.bins {
            let start = stats.min + i as f64 * width;
            let end = stats.min + (i + 1) as f64 * width;
            labels.push(format!("{:.1}-{:.1}", start, end));
        }

        for value in sample_values {
            let mut bin = ((value - stats.min) / width) as usize;
            if bin >= self.bins {
                bin = self.bins - 1; // max lands in the last bin
            }
            counts[bin] += 1;
        }

        ChartSeries {
            labels,
            values: counts.into_iter().map(|c| c as f64).collect(),
            title: format!("{} Distribution", numeric.name),
        }
    }
}

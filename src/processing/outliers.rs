//! IQR-based outlier filtering.

use crate::types::Dataset;

use super::reduce::numeric_values;

/// Quartiles and Tukey fences of a numeric sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Compute nearest-rank quartiles (`s[floor(n*0.25)]`, `s[floor(n*0.75)]` of the ascending
    /// sample) and fences at `1.5 * iqr`. Returns `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let q1 = sorted[nearest_rank(n, 0.25)];
        let q3 = sorted[nearest_rank(n, 0.75)];
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            iqr,
            lower: q1 - 1.5 * iqr,
            upper: q3 + 1.5 * iqr,
        })
    }

    /// Inclusive containment test.
    pub fn contains(&self, v: f64) -> bool {
        self.lower <= v && v <= self.upper
    }
}

fn nearest_rank(n: usize, q: f64) -> usize {
    ((n as f64 * q).floor() as usize).min(n - 1)
}

/// Keep rows whose `column` value is numeric and within the IQR fences computed from the
/// column's numeric values. Rows with a non-numeric or missing value are dropped.
pub fn filter_outliers(dataset: &Dataset, column: &str) -> Dataset {
    let Some(bounds) = IqrBounds::from_values(&numeric_values(dataset, column)) else {
        log::debug!("filterOutliers: column '{column}' has no numeric values; no rows kept");
        return dataset.filter_rows(|_| false);
    };

    dataset.filter_rows(|row| row.value(column).as_number().is_some_and(|v| bounds.contains(v)))
}

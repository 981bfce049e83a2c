//! Column statistics for [`crate::types::Dataset`].
//!
//! Only values that are numeric (see [`crate::types::Value::as_number`]) participate; missing and
//! non-numeric values are ignored.

use crate::types::{Dataset, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including nulls).
    Count,
    /// Sum of numeric values.
    Sum,
    /// Minimum numeric value.
    Min,
    /// Maximum numeric value.
    Max,
    /// Arithmetic mean of numeric values.
    Mean,
    /// Population standard deviation (denominator `n`) of numeric values.
    StdDev,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` is not in the column catalog.
/// - For numeric ops, returns `Some(Value::Null)` if the column has no numeric values.
/// - For `Count`, always returns `Some(Value::Number(row_count))`.
pub fn reduce(dataset: &Dataset, column: &str, op: ReduceOp) -> Option<Value> {
    if !dataset.has_column(column) {
        return None;
    }

    match op {
        ReduceOp::Count => Some(Value::Number(dataset.row_count() as f64)),
        _ => {
            let values = numeric_values(dataset, column);
            Some(reduce_numeric(&values, op).map(Value::Number).unwrap_or(Value::Null))
        }
    }
}

/// Numeric values of `column`, in row order.
pub fn numeric_values(dataset: &Dataset, column: &str) -> Vec<f64> {
    dataset
        .column_values(column)
        .filter_map(Value::as_number)
        .collect()
}

/// Reduce a slice of numbers. Returns `None` for an empty slice (and for `Count`, which is a row
/// statistic rather than a value statistic).
pub fn reduce_numeric(values: &[f64], op: ReduceOp) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;

    match op {
        ReduceOp::Count => None,
        ReduceOp::Sum => Some(values.iter().sum()),
        ReduceOp::Min => values.iter().copied().reduce(f64::min),
        ReduceOp::Max => values.iter().copied().reduce(f64::max),
        ReduceOp::Mean => Some(mean(values, n)),
        ReduceOp::StdDev => {
            let mean = mean(values, n);
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            Some((sum_sq / n).sqrt())
        }
    }
}

/// Falls back to summing `v / n` when the plain sum overflows.
fn mean(values: &[f64], n: f64) -> f64 {
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        sum / n
    } else {
        values.iter().map(|v| v / n).sum()
    }
}

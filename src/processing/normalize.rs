//! Per-column numeric normalization.
//!
//! Each target column is scaled independently. A degenerate column (zero range for min-max, zero
//! standard deviation for z-score, or no numeric values at all) is left unchanged and does not
//! block the other columns. So is a z-score column whose mean or standard deviation overflows.
//! Non-numeric values are never touched.

use crate::types::{Dataset, Value};

use super::operation::NormalizationMethod;
use super::reduce::{numeric_values, reduce_numeric, ReduceOp};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scaler {
    /// `shift` is `0.5` when `max - min` overflows, so the range is computed on halved operands.
    MinMax { min: f64, max: f64, shift: f64 },
    ZScore { mean: f64, std: f64 },
    Log,
}

impl Scaler {
    fn fit(dataset: &Dataset, column: &str, method: NormalizationMethod) -> Option<Self> {
        match method {
            NormalizationMethod::LogTransform => Some(Scaler::Log),
            NormalizationMethod::MinMax => {
                let values = numeric_values(dataset, column);
                let min = reduce_numeric(&values, ReduceOp::Min)?;
                let max = reduce_numeric(&values, ReduceOp::Max)?;
                if max == min {
                    log::debug!("minMaxScaling: column '{column}' has zero range; left unchanged");
                    return None;
                }
                let shift = if (max - min).is_finite() { 1.0 } else { 0.5 };
                Some(Scaler::MinMax { min, max, shift })
            }
            NormalizationMethod::ZScore => {
                let values = numeric_values(dataset, column);
                let mean = reduce_numeric(&values, ReduceOp::Mean)?;
                let std = reduce_numeric(&values, ReduceOp::StdDev)?;
                if std == 0.0 {
                    log::debug!("zScoreNormalization: column '{column}' has zero variance; left unchanged");
                    return None;
                }
                if !mean.is_finite() || !std.is_finite() {
                    log::debug!("zScoreNormalization: column '{column}' statistics overflow; left unchanged");
                    return None;
                }
                Some(Scaler::ZScore { mean, std })
            }
        }
    }

    /// Scaled value, or `None` if `v` is outside the scaler's domain.
    fn scale(&self, v: f64) -> Option<f64> {
        match *self {
            Scaler::MinMax { min, max, shift } => {
                Some((v * shift - min * shift) / (max * shift - min * shift))
            }
            Scaler::ZScore { mean, std } => Some((v - mean) / std),
            Scaler::Log if v >= 0.0 => Some((v + 1.0).ln()),
            Scaler::Log => None,
        }
    }
}

/// Normalize `columns` with `method`, returning a new dataset.
///
/// - `MinMax`: `(v - min) / (max - min)`
/// - `ZScore`: `(v - mean) / std` with the population standard deviation
/// - `LogTransform`: `ln(v + 1)` for `v >= 0`; negative values are kept as-is
pub fn normalize(dataset: &Dataset, method: NormalizationMethod, columns: &[String]) -> Dataset {
    let scalers: Vec<(&str, Scaler)> = columns
        .iter()
        .filter_map(|c| Scaler::fit(dataset, c, method).map(|s| (c.as_str(), s)))
        .collect();

    if scalers.is_empty() {
        return dataset.clone();
    }

    dataset.map_rows(|row| {
        let mut out = row.clone();
        for (column, scaler) in &scalers {
            let scaled = row.value(column).as_number().and_then(|v| scaler.scale(v));
            if let Some(s) = scaled {
                out.insert(*column, Value::Number(s));
            }
        }
        out
    })
}

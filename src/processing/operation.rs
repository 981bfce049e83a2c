//! The closed set of transformations and their parameters.
//!
//! Operations serialize adjacently tagged, in the shape the request and history layers use:
//!
//! ```json
//! { "operation": "normalize", "params": { "method": "minMaxScaling", "columns": ["age"] } }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};
use crate::types::{Dataset, Value};

/// A single transformation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "camelCase")]
pub enum Operation {
    /// Drop rows whose full content repeats an earlier row.
    RemoveDuplicates,
    /// Remove or fill missing (`null`, absent, `""`) values in `columns`.
    HandleMissingValues {
        strategy: MissingValueStrategy,
        columns: Vec<String>,
        /// Fill value, required by [`MissingValueStrategy::FillValue`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// Keep rows whose `column` value lies within the IQR fences.
    FilterOutliers { column: String },
    /// Rescale numeric values in `columns`.
    Normalize {
        method: NormalizationMethod,
        columns: Vec<String>,
    },
    /// Replace values in `columns` with first-seen category codes.
    EncodeCategorical { columns: Vec<String> },
}

/// How [`Operation::HandleMissingValues`] treats missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingValueStrategy {
    /// Drop rows with a missing value in any target column.
    Remove,
    /// Fill with the column's mean (columns without numeric values are left alone).
    FillMean,
    /// Fill with `0`.
    FillZero,
    /// Fill with the caller-supplied value.
    FillValue,
}

/// Scaling applied by [`Operation::Normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizationMethod {
    #[serde(rename = "minMaxScaling", alias = "minMax")]
    MinMax,
    #[serde(rename = "zScoreNormalization", alias = "zScore")]
    ZScore,
    #[serde(rename = "logTransform")]
    LogTransform,
}

impl Operation {
    /// Wire names of every supported operation.
    pub const NAMES: [&'static str; 5] = [
        "removeDuplicates",
        "handleMissingValues",
        "filterOutliers",
        "normalize",
        "encodeCategorical",
    ];

    /// Build an operation from its wire name and JSON params.
    ///
    /// An unrecognized `name` yields [`TransformError::UnknownOperation`]; params that do not
    /// decode for a recognized name yield [`TransformError::InvalidOperationParams`].
    ///
    /// ```rust
    /// use serde_json::json;
    /// use tabular_prep::processing::{MissingValueStrategy, Operation};
    ///
    /// let op = Operation::from_request(
    ///     "handleMissingValues",
    ///     &json!({ "strategy": "fillZero", "columns": ["age"] }),
    /// )
    /// .unwrap();
    /// assert!(matches!(
    ///     op,
    ///     Operation::HandleMissingValues { strategy: MissingValueStrategy::FillZero, .. }
    /// ));
    ///
    /// assert!(Operation::from_request("pivot", &json!({})).is_err());
    /// ```
    pub fn from_request(name: &str, params: &serde_json::Value) -> TransformResult<Self> {
        if !Self::NAMES.iter().any(|n| *n == name) {
            return Err(TransformError::UnknownOperation {
                name: name.to_string(),
            });
        }
        if name == "removeDuplicates" {
            return Ok(Operation::RemoveDuplicates);
        }

        let envelope = serde_json::json!({ "operation": name, "params": params });
        serde_json::from_value(envelope).map_err(|e| TransformError::invalid(name, e.to_string()))
    }

    /// Wire name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RemoveDuplicates => "removeDuplicates",
            Operation::HandleMissingValues { .. } => "handleMissingValues",
            Operation::FilterOutliers { .. } => "filterOutliers",
            Operation::Normalize { .. } => "normalize",
            Operation::EncodeCategorical { .. } => "encodeCategorical",
        }
    }

    /// Parameters of this operation as JSON (`{}` for parameterless operations).
    pub fn params(&self) -> serde_json::Value {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => map
                .remove("params")
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            _ => serde_json::Value::Object(Default::default()),
        }
    }

    /// Check parameters against the dataset's column catalog.
    ///
    /// Also rejects datasets whose rows carry keys outside the catalog, whatever the operation.
    pub fn validate(&self, dataset: &Dataset) -> TransformResult<()> {
        self.require_catalog_keys(dataset)?;
        match self {
            Operation::RemoveDuplicates => Ok(()),
            Operation::HandleMissingValues {
                strategy,
                columns,
                value,
            } => {
                if *strategy == MissingValueStrategy::FillValue && value.is_none() {
                    return Err(TransformError::invalid(
                        self.name(),
                        "strategy 'fillValue' requires a 'value'",
                    ));
                }
                self.require_columns(dataset, columns)
            }
            Operation::FilterOutliers { column } => {
                if column.is_empty() {
                    return Err(TransformError::invalid(self.name(), "'column' is required"));
                }
                self.require_columns(dataset, std::slice::from_ref(column))
            }
            Operation::Normalize { columns, .. } | Operation::EncodeCategorical { columns } => {
                self.require_columns(dataset, columns)
            }
        }
    }

    fn require_catalog_keys(&self, dataset: &Dataset) -> TransformResult<()> {
        let ids: HashSet<&str> = dataset.column_ids().collect();
        for (index, row) in dataset.rows.iter().enumerate() {
            if let Some(stray) = row.keys().find(|k| !ids.contains(k)) {
                return Err(TransformError::invalid(
                    self.name(),
                    format!("row {index} has key '{stray}' outside the column catalog"),
                ));
            }
        }
        Ok(())
    }

    fn require_columns(&self, dataset: &Dataset, columns: &[String]) -> TransformResult<()> {
        match columns.iter().find(|c| !dataset.has_column(c)) {
            Some(missing) => Err(TransformError::invalid(
                self.name(),
                format!("unknown column '{missing}'"),
            )),
            None => Ok(()),
        }
    }
}

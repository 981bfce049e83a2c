//! In-memory data transformations.
//!
//! The processing layer operates on [`crate::types::Dataset`] values produced by ingestion. Every
//! transformation is pure: it takes a dataset by reference and returns a new one, leaving the
//! input untouched. Row order is preserved by every operation, and the column catalog is carried
//! over unchanged (including when an operation drops every row).
//!
//! Request-level operations (see [`Operation`]):
//!
//! - [`Operation::RemoveDuplicates`]: first occurrence of each distinct row wins
//! - [`Operation::HandleMissingValues`]: `remove`, `fillMean`, `fillZero`, `fillValue`
//! - [`Operation::FilterOutliers`]: Tukey fences at `1.5 * IQR` over one column
//! - [`Operation::Normalize`]: min-max, z-score, or `ln(v + 1)`
//! - [`Operation::EncodeCategorical`]: first-seen label codes
//!
//! Lower-level building blocks:
//!
//! - [`filter()`]: row filtering by predicate
//! - [`map()`]: row mapping by user function
//! - [`reduce()`]: column statistics (count/sum/min/max/mean/std)
//!
//! ## Example
//!
//! ```rust
//! use tabular_prep::processing::{apply, reduce, NormalizationMethod, Operation, ReduceOp};
//! use tabular_prep::types::{Column, ColumnType, Dataset, Row, Value};
//!
//! let rows = [1.0, 2.0, 2.0, 5.0]
//!     .into_iter()
//!     .map(|v| [("score", Value::Number(v))].into_iter().collect::<Row>())
//!     .collect();
//! let ds = Dataset::new(vec![Column::from_header("score", ColumnType::Number)], rows);
//!
//! let deduped = apply(&ds, &Operation::RemoveDuplicates).unwrap();
//! assert_eq!(deduped.row_count(), 3);
//!
//! let scaled = apply(
//!     &deduped,
//!     &Operation::Normalize {
//!         method: NormalizationMethod::MinMax,
//!         columns: vec!["score".to_string()],
//!     },
//! )
//! .unwrap();
//! assert_eq!(reduce(&scaled, "score", ReduceOp::Max), Some(Value::Number(1.0)));
//! ```

pub mod dedup;
pub mod encode;
pub mod filter;
pub mod map;
pub mod missing;
pub mod normalize;
pub mod operation;
pub mod outliers;
pub mod reduce;

pub use dedup::remove_duplicates;
pub use encode::{category_codes, encode_categorical};
pub use filter::filter;
pub use map::map;
pub use missing::handle_missing_values;
pub use normalize::normalize;
pub use operation::{MissingValueStrategy, NormalizationMethod, Operation};
pub use outliers::{filter_outliers, IqrBounds};
pub use reduce::{reduce, ReduceOp};

use crate::error::TransformResult;
use crate::types::Dataset;

/// Validate `operation` against `dataset` and apply it, returning the transformed dataset.
///
/// Errors are [`crate::TransformError::InvalidOperationParams`] for parameters that reference
/// unknown columns or are incomplete. The input dataset is never modified.
pub fn apply(dataset: &Dataset, operation: &Operation) -> TransformResult<Dataset> {
    operation.validate(dataset)?;

    let out = match operation {
        Operation::RemoveDuplicates => remove_duplicates(dataset),
        Operation::HandleMissingValues {
            strategy,
            columns,
            value,
        } => handle_missing_values(dataset, *strategy, columns, value.as_ref())?,
        Operation::FilterOutliers { column } => filter_outliers(dataset, column),
        Operation::Normalize { method, columns } => normalize(dataset, *method, columns),
        Operation::EncodeCategorical { columns } => encode_categorical(dataset, columns),
    };

    log::debug!(
        "{}: {} -> {} rows",
        operation.name(),
        dataset.row_count(),
        out.row_count()
    );
    Ok(out)
}

//! Duplicate row removal.

use std::collections::HashSet;

use crate::types::Dataset;

/// Keep the first occurrence of every distinct row, preserving relative order.
///
/// Two rows are duplicates iff they hold the same keys with exactly equal values (including
/// type: `1` and `"1"` differ). Key order never matters.
pub fn remove_duplicates(dataset: &Dataset) -> Dataset {
    let mut seen = HashSet::with_capacity(dataset.row_count());
    let mut rows = Vec::with_capacity(dataset.row_count());
    for row in &dataset.rows {
        if seen.insert(row.key()) {
            rows.push(row.clone());
        }
    }
    Dataset::new(dataset.columns.clone(), rows)
}

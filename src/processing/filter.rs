//! Row filtering for [`crate::types::Dataset`].

use crate::types::{Dataset, Row};

/// Returns a new [`Dataset`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`Dataset::filter_rows`].
pub fn filter<F>(dataset: &Dataset, predicate: F) -> Dataset
where
    F: FnMut(&Row) -> bool,
{
    dataset.filter_rows(predicate)
}

//! Row mapping for [`crate::types::Dataset`].

use crate::types::{Dataset, Row};

/// Returns a new [`Dataset`] by applying `mapper` to every row.
///
/// This is a convenience wrapper around [`Dataset::map_rows`].
///
/// # Panics
///
/// Panics if `mapper` returns a row with a key outside the column catalog.
pub fn map<F>(dataset: &Dataset, mapper: F) -> Dataset
where
    F: FnMut(&Row) -> Row,
{
    dataset.map_rows(mapper)
}

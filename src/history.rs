//! Audit records for applied transformations.
//!
//! Callers that persist datasets append a [`HistoryEntry`] after each successful
//! [`crate::processing::apply`]. Entries carry the operation's wire name and params, so they
//! replay through [`Operation::from_request`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::processing::{apply, Operation};
use crate::types::Dataset;

/// One applied operation: `{ operation, params, timestamp }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub operation: String,
    pub params: serde_json::Value,
    /// UTC, serialized as RFC 3339.
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Record `operation` as applied now.
    pub fn record(operation: &Operation) -> Self {
        Self::record_at(operation, Utc::now())
    }

    pub fn record_at(operation: &Operation, timestamp: DateTime<Utc>) -> Self {
        Self {
            operation: operation.name().to_string(),
            params: operation.params(),
            timestamp,
        }
    }

    /// Rebuild the operation this entry was recorded from.
    pub fn to_operation(&self) -> TransformResult<Operation> {
        Operation::from_request(&self.operation, &self.params)
    }
}

/// [`apply`] and record the entry for it. No entry is produced when the operation fails.
pub fn apply_logged(dataset: &Dataset, operation: &Operation) -> TransformResult<(Dataset, HistoryEntry)> {
    let out = apply(dataset, operation)?;
    Ok((out, HistoryEntry::record(operation)))
}

/// Thread `dataset` through `operations` in order, stopping at the first error.
///
/// Returns the final dataset together with one entry per applied operation.
pub fn apply_all(dataset: &Dataset, operations: &[Operation]) -> TransformResult<(Dataset, Vec<HistoryEntry>)> {
    let mut current = dataset.clone();
    let mut history = Vec::with_capacity(operations.len());
    for op in operations {
        let (next, entry) = apply_logged(&current, op)?;
        current = next;
        history.push(entry);
    }
    Ok((current, history))
}

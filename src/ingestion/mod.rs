//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`parse`] (from [`unified`]) which:
//!
//! - detects the container format from magic bytes and the caller's [`FormatHint`]
//! - extracts the first sheet into an in-memory [`crate::types::Dataset`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - `excel` (feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod grid;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    LogObserver, StdErrObserver,
};
pub use unified::{parse, parse_with_options, FormatHint, ParseOptions, SpreadsheetFormat};

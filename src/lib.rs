//! `tabular-prep` ingests spreadsheet uploads into an in-memory [`types::Dataset`] and runs pure,
//! deterministic cleaning transformations over it.
//!
//! The primary entrypoints are [`ingestion::parse`], which turns raw upload bytes into a dataset,
//! and [`processing::apply`], which runs one [`processing::Operation`] and returns a new dataset.
//!
//! ## What you can ingest
//!
//! **Containers (detected from magic bytes, then the caller's extension / MIME hint):**
//!
//! - **CSV** (and other delimited text: `;`, tab and `|` are detected automatically)
//! - **Workbooks** (requires the Cargo feature `excel`, on by default): `.xlsx`, `.xlsm`,
//!   `.xlsb`, `.xls`, `.ods`
//!
//! Only the first sheet of a workbook is read. Its first row is the header; every later row
//! becomes a [`types::Row`] keyed by column id. Sheets whose header cannot be used as-is fall back
//! to a positional walk with generated `Column{n}` names.
//!
//! **Values and column types:**
//!
//! Cells are [`types::Value`]s: `Null`, `Number(f64)` or `Text(String)`. Empty cells become
//! `Text("")`. Each column is typed [`types::ColumnType::Number`] or
//! [`types::ColumnType::String`] from the first data row (or from every row, with
//! [`types::InferenceMode::FullScan`]).
//!
//! ## Quick example
//!
//! ```rust
//! use tabular_prep::ingestion::{parse, FormatHint};
//! use tabular_prep::processing::{apply, Operation};
//! use tabular_prep::types::{ColumnType, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = b"A,B\n1,x\n2,y\n1,x\n";
//! let ds = parse(bytes, &FormatHint::extension("csv"))?;
//! assert_eq!(ds.columns[0].column_type, ColumnType::Number);
//! assert_eq!(ds.columns[1].column_type, ColumnType::String);
//!
//! let deduped = apply(&ds, &Operation::RemoveDuplicates)?;
//! assert_eq!(deduped.row_count(), 2);
//! assert_eq!(deduped.rows[1].value("B"), &Value::from("y"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: format detection, CSV and workbook readers, ingestion observers
//! - [`types`]: values, rows, column catalog and dataset
//! - [`processing`]: the operation set and its building blocks (filter/map/reduce)
//! - [`history`]: `{ operation, params, timestamp }` records for applied operations
//! - [`export`]: write a dataset back out as CSV or XLSX
//! - [`execution`]: parallel batch runs with throttling, metrics and observers
//! - [`error`]: error types for each layer

pub mod error;
pub mod execution;
pub mod export;
pub mod history;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{ExportError, ExportResult, IngestionError, IngestionResult, TransformError, TransformResult};

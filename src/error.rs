use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for transformations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Convenience result type for export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Error type returned by [`crate::ingestion::parse`].
///
/// Shared across CSV and workbook ingestion. Failures are always reported; a malformed or empty
/// upload never turns into an empty [`crate::types::Dataset`].
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The workbook container has no sheets.
    #[error("workbook has no sheets")]
    EmptyWorkbook,

    /// The first sheet has no cell range at all.
    #[error("sheet '{sheet}' is empty")]
    EmptySheet { sheet: String },

    /// The bytes do not parse as any supported container.
    #[error("unreadable format: {message}")]
    UnreadableFormat { message: String },
}

impl From<csv::Error> for IngestionError {
    fn from(e: csv::Error) -> Self {
        IngestionError::UnreadableFormat {
            message: format!("csv: {e}"),
        }
    }
}

#[cfg(feature = "excel")]
impl From<calamine::Error> for IngestionError {
    fn from(e: calamine::Error) -> Self {
        IngestionError::UnreadableFormat {
            message: format!("workbook: {e}"),
        }
    }
}

/// Error type returned by [`crate::processing::apply`].
#[derive(Debug, Error)]
pub enum TransformError {
    /// The operation tag is not one of the supported operations.
    #[error("unknown operation '{name}'")]
    UnknownOperation { name: String },

    /// Required parameters are absent or malformed.
    #[error("invalid parameters for '{operation}': {message}")]
    InvalidOperationParams { operation: String, message: String },
}

impl TransformError {
    pub(crate) fn invalid(operation: &str, message: impl Into<String>) -> Self {
        TransformError::InvalidOperationParams {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

/// Error type returned by [`crate::export`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// Underlying I/O error while flushing the in-memory writer.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// XLSX serialization error (feature-gated behind `excel`).
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The dataset does not fit the target format's limits.
    #[error("dataset exceeds format limits: {message}")]
    Limit { message: String },
}

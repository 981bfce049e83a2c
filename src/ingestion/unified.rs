//! Unified ingestion entrypoint.
//!
//! Most callers should use [`parse`], which turns an uploaded byte buffer into an in-memory
//! [`crate::types::Dataset`].
//!
//! - The container format is detected from magic bytes first, then from the caller's
//!   [`FormatHint`] (extension, then MIME type), then by checking whether the bytes look like text.
//! - If an [`super::observability::IngestionObserver`] is provided via [`ParseOptions`],
//!   success/failure/alerts are reported to it.

use std::fmt;
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Dataset, InferenceMode};

use super::grid::Extraction;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";
const TEXT_SNIFF_LEN: usize = 1024;

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Delimited text.
    Csv,
    /// Spreadsheet workbook (`xlsx`, `xls`, `xlsm`, `xlsb`, `ods`), feature-gated behind `excel`.
    Workbook,
}

impl SpreadsheetFormat {
    /// Parse a format from a file extension (case-insensitive, leading dot optional).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }

    /// Parse a format from a MIME type (parameters such as `; charset=utf-8` are ignored).
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "text/csv" | "application/csv" | "text/plain" | "text/tab-separated-values" => Some(Self::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.ms-excel"
            | "application/vnd.ms-excel.sheet.macroenabled.12"
            | "application/vnd.ms-excel.sheet.binary.macroenabled.12"
            | "application/vnd.oasis.opendocument.spreadsheet" => Some(Self::Workbook),
            _ => None,
        }
    }

    /// Detect the container format of `bytes`.
    ///
    /// Magic bytes win over hints. A workbook MIME type without workbook magic is common for
    /// CSV uploads from some browsers, so such buffers are read as CSV when they look like text.
    /// An explicit workbook extension is honored as-is (and fails later if the bytes disagree).
    pub fn detect(bytes: &[u8], hint: &FormatHint) -> IngestionResult<Self> {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            return Ok(Self::Workbook);
        }

        if let Some(fmt) = hint.extension.as_deref().and_then(Self::from_extension) {
            return Ok(fmt);
        }

        let looks_like_text = looks_like_text(bytes);
        match hint.mime_type.as_deref().and_then(Self::from_mime_type) {
            Some(Self::Csv) => Ok(Self::Csv),
            _ if looks_like_text => Ok(Self::Csv),
            _ => Err(IngestionError::UnreadableFormat {
                message: format!(
                    "cannot detect a spreadsheet format (extension={:?}, mime_type={:?})",
                    hint.extension, hint.mime_type
                ),
            }),
        }
    }
}

fn looks_like_text(bytes: &[u8]) -> bool {
    !bytes.iter().take(TEXT_SNIFF_LEN).any(|b| *b == 0)
}

/// Declared metadata accompanying an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatHint {
    /// Declared MIME type, e.g. `text/csv`.
    pub mime_type: Option<String>,
    /// File extension, with or without the leading dot.
    pub extension: Option<String>,
}

impl FormatHint {
    /// Hint carrying only a file extension.
    pub fn extension(ext: impl Into<String>) -> Self {
        Self {
            extension: Some(ext.into()),
            ..Default::default()
        }
    }

    /// Hint carrying only a MIME type.
    pub fn mime_type(mime: impl Into<String>) -> Self {
        Self {
            mime_type: Some(mime.into()),
            ..Default::default()
        }
    }
}

/// Options controlling ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ParseOptions {
    /// Declared MIME type / extension of the upload.
    pub hint: FormatHint,
    /// How column types are inferred.
    pub inference: InferenceMode,
    /// CSV delimiter override; `None` detects it from the first line.
    pub csv_delimiter: Option<u8>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("hint", &self.hint)
            .field("inference", &self.inference)
            .field("csv_delimiter", &self.csv_delimiter)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            hint: FormatHint::default(),
            inference: InferenceMode::default(),
            csv_delimiter: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Parse an uploaded spreadsheet into a [`Dataset`].
///
/// Uses the first sheet only; row 0 is the header row; column types are inferred from the first
/// data row. Equivalent to [`parse_with_options`] with default options and the given hint.
///
/// # Examples
///
/// ```rust
/// use tabular_prep::ingestion::{parse, FormatHint};
/// use tabular_prep::types::{ColumnType, Value};
///
/// let ds = parse(b"A,B\n1,x\n2,y\n", &FormatHint::extension("csv")).unwrap();
/// assert_eq!(ds.columns[0].column_type, ColumnType::Number);
/// assert_eq!(ds.columns[1].column_type, ColumnType::String);
/// assert_eq!(ds.rows[1].value("B"), &Value::from("y"));
/// ```
pub fn parse(bytes: &[u8], hint: &FormatHint) -> IngestionResult<Dataset> {
    let options = ParseOptions {
        hint: hint.clone(),
        ..Default::default()
    };
    parse_with_options(bytes, &options)
}

/// Parse an uploaded spreadsheet with explicit [`ParseOptions`].
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use std::sync::Arc;
///
/// use tabular_prep::ingestion::{parse_with_options, FormatHint, LogObserver, ParseOptions};
/// use tabular_prep::types::InferenceMode;
///
/// # fn main() -> Result<(), tabular_prep::IngestionError> {
/// let bytes = std::fs::read("upload.xlsx").unwrap();
/// let opts = ParseOptions {
///     hint: FormatHint::extension("xlsx"),
///     inference: InferenceMode::FullScan,
///     observer: Some(Arc::new(LogObserver)),
///     ..Default::default()
/// };
/// let ds = parse_with_options(&bytes, &opts)?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn parse_with_options(bytes: &[u8], options: &ParseOptions) -> IngestionResult<Dataset> {
    let detected = SpreadsheetFormat::detect(bytes, &options.hint);
    let ctx = IngestionContext {
        format: detected.as_ref().ok().copied(),
        byte_len: bytes.len(),
    };

    let result = detected.and_then(|fmt| match fmt {
        SpreadsheetFormat::Csv => super::csv::extract_csv(bytes, options.csv_delimiter, options.inference),
        SpreadsheetFormat::Workbook => extract_workbook_dispatch(bytes, options.inference),
    });

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(ex) => obs.on_success(
                &ctx,
                IngestionStats {
                    rows: ex.dataset.row_count(),
                    columns: ex.dataset.columns.len(),
                    used_fallback: ex.used_fallback,
                },
            ),
            Err(e) => {
                let sev = IngestionSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result.map(|ex| ex.dataset)
}

fn extract_workbook_dispatch(bytes: &[u8], mode: InferenceMode) -> IngestionResult<Extraction> {
    // Avoid unused warnings when the feature is off.
    let _ = (bytes, mode);

    #[cfg(feature = "excel")]
    {
        super::excel::extract_workbook(bytes, mode)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::UnreadableFormat {
            message: "workbook ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_and_mime_mapping() {
        assert_eq!(SpreadsheetFormat::from_extension(".CSV"), Some(SpreadsheetFormat::Csv));
        assert_eq!(SpreadsheetFormat::from_extension("xls"), Some(SpreadsheetFormat::Workbook));
        assert_eq!(SpreadsheetFormat::from_extension("pdf"), None);
        assert_eq!(
            SpreadsheetFormat::from_mime_type("text/csv; charset=utf-8"),
            Some(SpreadsheetFormat::Csv)
        );
        assert_eq!(
            SpreadsheetFormat::from_mime_type(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            ),
            Some(SpreadsheetFormat::Workbook)
        );
    }

    #[test]
    fn magic_bytes_win_over_hints() {
        let hint = FormatHint::extension("csv");
        assert_eq!(
            SpreadsheetFormat::detect(b"PK\x03\x04rest", &hint).unwrap(),
            SpreadsheetFormat::Workbook
        );
        assert_eq!(
            SpreadsheetFormat::detect(OLE_MAGIC, &hint).unwrap(),
            SpreadsheetFormat::Workbook
        );
    }

    #[test]
    fn excel_mime_with_text_bytes_reads_as_csv() {
        let hint = FormatHint::mime_type("application/vnd.ms-excel");
        assert_eq!(
            SpreadsheetFormat::detect(b"a,b\n1,2\n", &hint).unwrap(),
            SpreadsheetFormat::Csv
        );
    }

    #[test]
    fn binary_without_hint_is_unreadable() {
        let err = SpreadsheetFormat::detect(b"\x00\x01\x02", &FormatHint::default()).unwrap_err();
        assert!(matches!(err, IngestionError::UnreadableFormat { .. }));
    }

    #[test]
    fn text_without_hint_reads_as_csv() {
        assert_eq!(
            SpreadsheetFormat::detect(b"x\n1\n", &FormatHint::default()).unwrap(),
            SpreadsheetFormat::Csv
        );
    }
}

//! Serialize a [`Dataset`] back into spreadsheet bytes.
//!
//! Export is the inverse of [`crate::ingestion::parse`]: the header row holds column names in
//! catalog order, followed by one line per row in row order. `null` and absent keys become empty
//! cells.

use csv::{QuoteStyle, WriterBuilder};

use crate::error::ExportResult;
#[cfg(feature = "excel")]
use crate::error::ExportError;
use crate::ingestion::csv::CANDIDATE_DELIMITERS;
use crate::types::Dataset;

/// Output container for [`export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    /// Single-sheet workbook (feature `excel`).
    #[cfg(feature = "excel")]
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            #[cfg(feature = "excel")]
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            #[cfg(feature = "excel")]
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

/// Serialize `dataset` in `format`.
pub fn export(dataset: &Dataset, format: ExportFormat) -> ExportResult<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_csv_bytes(dataset),
        #[cfg(feature = "excel")]
        ExportFormat::Xlsx => to_xlsx_bytes(dataset),
    }
}

/// Comma-separated output. Numbers use their shortest round-tripping decimal form.
///
/// Header names containing another candidate delimiter (`;`, tab, `|`) are quoted so delimiter
/// detection on re-import still settles on the comma.
pub fn to_csv_bytes(dataset: &Dataset) -> ExportResult<Vec<u8>> {
    let header_style = if dataset.columns.iter().any(|c| has_foreign_delimiter(&c.name)) {
        QuoteStyle::Always
    } else {
        QuoteStyle::Necessary
    };
    let mut header = WriterBuilder::new()
        .quote_style(header_style)
        .from_writer(Vec::new());
    header.write_record(dataset.columns.iter().map(|c| c.name.as_str()))?;
    let out = header.into_inner().map_err(|e| e.into_error())?;

    let mut wtr = WriterBuilder::new().from_writer(out);
    for row in &dataset.rows {
        wtr.write_record(dataset.columns.iter().map(|c| row.value(&c.id).to_string()))?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

fn has_foreign_delimiter(text: &str) -> bool {
    CANDIDATE_DELIMITERS
        .iter()
        .any(|&d| d != b',' && text.as_bytes().contains(&d))
}

/// XLSX output with a single worksheet named `Sheet1`.
#[cfg(feature = "excel")]
pub fn to_xlsx_bytes(dataset: &Dataset) -> ExportResult<Vec<u8>> {
    use crate::types::Value;
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sheet1")?;

    for (c, column) in dataset.columns.iter().enumerate() {
        let col = xlsx_col(c)?;
        worksheet.write_string(0, col, &column.name)?;
        for (r, row) in dataset.rows.iter().enumerate() {
            let line = u32::try_from(r + 1).map_err(|_| ExportError::Limit {
                message: format!("{} rows do not fit a worksheet", dataset.row_count()),
            })?;
            match row.value(&column.id) {
                Value::Null => {}
                Value::Number(n) => {
                    worksheet.write_number(line, col, *n)?;
                }
                Value::Text(s) if s.is_empty() => {}
                Value::Text(s) => {
                    worksheet.write_string(line, col, s)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(feature = "excel")]
fn xlsx_col(index: usize) -> ExportResult<u16> {
    u16::try_from(index).map_err(|_| ExportError::Limit {
        message: format!("column index {index} does not fit a worksheet"),
    })
}

#![cfg(feature = "excel")]

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Dataset, InferenceMode, Value};

use super::grid::{extract_dataset, Extraction, SheetGrid};

/// Ingest an in-memory workbook (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`) into a [`Dataset`].
///
/// Behavior:
/// - Always uses the first sheet in the workbook; other sheets are ignored
/// - Row 0 of the sheet's used range is the header row
/// - Numeric and date cells become numbers (dates as their serial value); everything else is text
pub fn ingest_workbook_from_bytes(bytes: &[u8], mode: InferenceMode) -> IngestionResult<Dataset> {
    Ok(extract_workbook(bytes, mode)?.dataset)
}

pub(crate) fn extract_workbook(bytes: &[u8], mode: InferenceMode) -> IngestionResult<Extraction> {
    let grid = read_first_sheet(bytes)?;
    Ok(extract_dataset(&grid, mode))
}

fn read_first_sheet(bytes: &[u8]) -> IngestionResult<SheetGrid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet = first_sheet_name(workbook.sheet_names())?;

    let range = workbook.worksheet_range(&sheet)?;
    if range.is_empty() {
        return Err(IngestionError::EmptySheet { sheet });
    }

    let cells = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();
    Ok(SheetGrid::new(sheet, cells))
}

fn first_sheet_name(names: Vec<String>) -> IngestionResult<String> {
    names.into_iter().next().ok_or(IngestionError::EmptyWorkbook)
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Text(String::new()),
        Data::String(s) => Value::Text(s.clone()),
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Bool(b) => Value::Text(b.to_string()),
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Value::Text(s.clone()),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sheets_is_an_empty_workbook() {
        let err = first_sheet_name(Vec::new()).unwrap_err();
        assert!(matches!(err, IngestionError::EmptyWorkbook));
        assert_eq!(
            first_sheet_name(vec!["Data".to_string(), "Other".to_string()]).unwrap(),
            "Data"
        );
    }

    #[test]
    fn converts_cells_to_values() {
        assert_eq!(convert_cell(&Data::Int(3)), Value::Number(3.0));
        assert_eq!(convert_cell(&Data::Float(2.5)), Value::Number(2.5));
        assert_eq!(convert_cell(&Data::Bool(true)), Value::from("true"));
        assert_eq!(convert_cell(&Data::Empty), Value::from(""));
        assert_eq!(convert_cell(&Data::String("x".into())), Value::from("x"));
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        let err = ingest_workbook_from_bytes(b"PK\x03\x04 not really a zip", InferenceMode::FirstRow)
            .unwrap_err();
        assert!(matches!(err, IngestionError::UnreadableFormat { .. }));
    }
}

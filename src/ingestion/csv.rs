//! CSV ingestion implementation.

use crate::error::{IngestionError, IngestionResult};
use crate::types::{parse_finite, Dataset, InferenceMode, Value};

use super::grid::{extract_dataset, Extraction, SheetGrid};

const CSV_SHEET: &str = "csv";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub(crate) const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Ingest CSV bytes into an in-memory [`Dataset`].
///
/// Rules:
///
/// - The first record is the header row.
/// - The delimiter is detected from the first line unless `delimiter` is given.
/// - A field whose trimmed text parses as a finite number becomes [`Value::Number`]; anything
///   else is kept verbatim as [`Value::Text`]. Missing trailing fields read as `""`.
pub fn ingest_csv_from_bytes(
    bytes: &[u8],
    delimiter: Option<u8>,
    mode: InferenceMode,
) -> IngestionResult<Dataset> {
    Ok(extract_csv(bytes, delimiter, mode)?.dataset)
}

/// Ingest CSV data from an existing CSV reader.
///
/// If the reader was built with `has_headers(true)`, its header record is used as row 0.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    mode: InferenceMode,
) -> IngestionResult<Dataset> {
    let grid = read_grid(rdr)?;
    Ok(extract_dataset(&grid, mode).dataset)
}

pub(crate) fn extract_csv(
    bytes: &[u8],
    delimiter: Option<u8>,
    mode: InferenceMode,
) -> IngestionResult<Extraction> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(bytes));

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);
    let grid = read_grid(&mut rdr)?;
    Ok(extract_dataset(&grid, mode))
}

fn read_grid<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<SheetGrid> {
    let mut cells: Vec<Vec<Value>> = Vec::new();
    if rdr.has_headers() {
        cells.push(record_cells(rdr.byte_headers()?));
    }
    for result in rdr.byte_records() {
        let record = result?;
        cells.push(record_cells(&record));
    }

    if cells.iter().all(|r| r.is_empty()) {
        return Err(IngestionError::EmptySheet {
            sheet: CSV_SHEET.to_string(),
        });
    }
    Ok(SheetGrid::new(CSV_SHEET, cells))
}

fn record_cells(record: &csv::ByteRecord) -> Vec<Value> {
    record
        .iter()
        .map(|field| csv_cell(&String::from_utf8_lossy(field)))
        .collect()
}

fn csv_cell(raw: &str) -> Value {
    match parse_finite(raw) {
        Some(v) => Value::Number(v),
        None => Value::Text(raw.to_string()),
    }
}

/// Pick the most frequent candidate delimiter on the header line (`,` when none appear).
///
/// Quoted text is skipped, so a header such as `"a;b;c",d` is still comma-separated. The header
/// line ends at the first newline outside quotes.
pub fn detect_delimiter(bytes: &[u8]) -> u8 {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for &b in bytes {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => break,
            _ if !in_quotes => {
                if let Some(i) = CANDIDATE_DELIMITERS.iter().position(|c| *c == b) {
                    counts[i] += 1;
                }
            }
            _ => {}
        }
    }

    let mut best = b',';
    let mut best_count = 0usize;
    for (&candidate, &count) in CANDIDATE_DELIMITERS.iter().zip(&counts) {
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

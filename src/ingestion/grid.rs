//! Header/row extraction from a rectangular cell grid.
//!
//! Both CSV and workbook readers produce a [`SheetGrid`] for the first sheet; this module turns it
//! into a [`Dataset`]. Extraction runs in two passes:
//!
//! 1. **Structured**: every cell of row 0 becomes a header. Blank headers are named `Column{n}`
//!    (1-based position) and repeated header text gets a `_{k}` suffix, so no column is lost.
//!    Data rows whose cells under those headers are all empty are skipped.
//! 2. **Range walk** (fallback): only attempted when the structured pass produced no rows while
//!    the grid spans more than one row or column. Headers cover the widest row of the grid rather
//!    than row 0 alone, and every row with any non-empty cell is kept.

use std::collections::HashSet;

use crate::types::{infer_column_type, Column, Dataset, InferenceMode, Row, Value};

/// Rectangular cell matrix of a single sheet. Empty cells hold `Value::Text("")`.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    /// Sheet name (`"csv"` for delimited text).
    pub name: String,
    /// Row-major cells; rows may be ragged.
    pub cells: Vec<Vec<Value>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, cells: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    fn row_is_blank(&self, row: usize) -> bool {
        self.cells
            .get(row)
            .is_none_or(|r| r.iter().all(Value::is_missing))
    }
}

/// Outcome of extracting a dataset from a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub dataset: Dataset,
    /// `true` if the range-walk fallback produced the result.
    pub used_fallback: bool,
}

/// Convert a grid into a dataset, inferring column types with `mode`.
pub fn extract_dataset(grid: &SheetGrid, mode: InferenceMode) -> Extraction {
    let (headers, rows) = structured_pass(grid);
    let spans_more_than_one_cell = grid.height() > 1 || grid.width() > 1;

    let (headers, rows, used_fallback) = if rows.is_empty() && spans_more_than_one_cell {
        let (headers, rows) = range_walk(grid);
        log::debug!(
            "sheet '{}': structured extraction found no rows; range walk recovered {} rows",
            grid.name,
            rows.len()
        );
        (headers, rows, true)
    } else {
        (headers, rows, false)
    };

    let columns = headers
        .iter()
        .map(|(_, header)| {
            let column_type = infer_column_type(rows.iter().map(|r| r.value(header)), mode);
            Column::from_header(header.clone(), column_type)
        })
        .collect();

    Extraction {
        dataset: Dataset::new(columns, rows),
        used_fallback,
    }
}

type Headers = Vec<(usize, String)>;

fn structured_pass(grid: &SheetGrid) -> (Headers, Vec<Row>) {
    let width = grid.cells.first().map_or(0, Vec::len);
    let headers = name_headers(grid, width);

    let rows = (1..grid.height())
        .filter(|&r| {
            headers
                .iter()
                .any(|(c, _)| grid.cell(r, *c).is_some_and(|v| !v.is_missing()))
        })
        .map(|r| build_row(grid, r, &headers))
        .collect();

    (headers, rows)
}

fn range_walk(grid: &SheetGrid) -> (Headers, Vec<Row>) {
    let headers = name_headers(grid, grid.width());

    let rows = (1..grid.height())
        .filter(|&r| !grid.row_is_blank(r))
        .map(|r| build_row(grid, r, &headers))
        .collect();

    (headers, rows)
}

/// Headers for the first `width` columns of row 0, unique and never blank.
fn name_headers(grid: &SheetGrid, width: usize) -> Headers {
    let mut seen: HashSet<String> = HashSet::new();
    (0..width)
        .map(|c| {
            let raw = grid.cell(0, c).map(Value::to_string).unwrap_or_default();
            let base = if raw.trim().is_empty() {
                format!("Column{}", c + 1)
            } else {
                raw
            };
            (c, unique_header(&mut seen, base))
        })
        .collect()
}

fn unique_header(seen: &mut HashSet<String>, base: String) -> String {
    if seen.insert(base.clone()) {
        return base;
    }
    let mut k = 2usize;
    loop {
        let candidate = format!("{base}_{k}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        k += 1;
    }
}

fn build_row(grid: &SheetGrid, r: usize, headers: &Headers) -> Row {
    headers
        .iter()
        .map(|(c, header)| {
            let v = grid
                .cell(r, *c)
                .cloned()
                .unwrap_or_else(|| Value::Text(String::new()));
            (header.clone(), v)
        })
        .collect()
}

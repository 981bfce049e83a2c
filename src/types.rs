//! Core data model types shared by ingestion, processing and export.
//!
//! A [`Dataset`] is an ordered column catalog ([`Column`]s) plus ordered [`Row`]s. Rows map column
//! ids to scalar [`Value`]s; a key that is absent from a row reads as [`Value::Null`].
//!
//! All types serialize with `serde` in the shape the persistence layer stores verbatim:
//!
//! ```json
//! {
//!   "columns": [{ "id": "age", "name": "age", "type": "number" }],
//!   "rows": [{ "age": 31 }, { "age": null }]
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical type of a column, inferred at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Values parse as finite numbers.
    Number,
    /// Anything else.
    String,
}

/// How column types are inferred from row values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceMode {
    /// Look only at the first data row's value (the historical behavior).
    #[default]
    FirstRow,
    /// Scan the whole column: `Number` iff at least one non-missing value exists and every
    /// non-missing value is numeric.
    FullScan,
}

/// A single entry in a [`Dataset`]'s column catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Stable key used in every [`Row`].
    pub id: String,
    /// Display label.
    pub name: String,
    /// Inferred logical type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    /// Create a new column descriptor.
    pub fn new(id: impl Into<String>, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type,
        }
    }

    /// Create a column whose id and display name are both the raw header text.
    pub fn from_header(header: impl Into<String>, column_type: ColumnType) -> Self {
        let header = header.into();
        Self {
            id: header.clone(),
            name: header,
            column_type,
        }
    }
}

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Numeric value.
    Number(f64),
    /// Text value (possibly empty).
    Text(String),
}

static NULL: Value = Value::Null;

impl Value {
    /// Returns the value as a finite `f64`, if it is one.
    ///
    /// Text values count as numeric when their trimmed content parses as a finite number, so a
    /// CSV field like `" 42 "` participates in statistics the same way as a numeric cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) if v.is_finite() => Some(*v),
            Value::Text(s) => parse_finite(s),
            _ => None,
        }
    }

    /// Returns `true` for the values treated as missing: null and the empty string.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::Number(_) => false,
        }
    }

    /// Returns `true` if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Hashable identity of the value, with exact equality including type.
    pub fn key(&self) -> ValueKey<'_> {
        match self {
            Value::Null => ValueKey::Null,
            Value::Number(v) => ValueKey::Number(canonical_bits(*v)),
            Value::Text(s) => ValueKey::Text(s.as_str()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Hashable, type-exact identity of a [`Value`].
///
/// `Number(1.0)` and `Text("1")` are different keys. `-0.0` and `0.0` share a key, as do all NaNs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey<'a> {
    Null,
    Number(u64),
    Text(&'a str),
}

fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

/// Parse trimmed text as a finite number.
pub(crate) fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A single record: column id -> value.
///
/// Keys are kept in sorted order so that two rows with the same content compare and serialize
/// identically regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Value stored under `id`, if the key is present.
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    /// Value stored under `id`; absent keys read as [`Value::Null`].
    pub fn value(&self, id: &str) -> &Value {
        self.0.get(id).unwrap_or(&NULL)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, id: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(id.into(), value)
    }

    /// Returns `true` if the row has an entry for `id`.
    pub fn contains_key(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Iterate `(id, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate the row's keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the row has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Order-independent, type-exact identity of the full row content.
    pub fn key(&self) -> Vec<(&str, ValueKey<'_>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.key())).collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// In-memory tabular dataset.
///
/// `columns` defines display/export order; `rows` order is meaningful for previews. Every row's
/// keys are expected to be a subset of the catalog ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Ordered column catalog.
    pub columns: Vec<Column>,
    /// Ordered rows.
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Create a dataset from a column catalog and rows.
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate catalog ids in order.
    pub fn column_ids(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.id.as_str())
    }

    /// Look up a column descriptor by id.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Returns `true` if `id` is in the column catalog.
    pub fn has_column(&self, id: &str) -> bool {
        self.column(id).is_some()
    }

    /// Iterate the values of one column in row order (absent keys read as null).
    pub fn column_values<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |row| row.value(id))
    }

    /// A preview containing at most the first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the column catalog and the relative order of kept rows.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Row) -> bool,
    {
        let rows = self.rows.iter().filter(|row| predicate(row)).cloned().collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Create a new dataset by applying `mapper` to every row.
    ///
    /// The returned dataset preserves the column catalog.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` adds a key that is neither in the input row nor in the column catalog.
    pub fn map_rows<F>(&self, mut mapper: F) -> Self
    where
        F: FnMut(&Row) -> Row,
    {
        let ids: HashSet<&str> = self.column_ids().collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row);
                if let Some(added) = out.keys().find(|k| !ids.contains(k) && row.get(k).is_none()) {
                    panic!("mapped row adds key '{added}' outside the column catalog");
                }
                out
            })
            .collect();

        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Reduce (fold) all rows into an accumulator value.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &Row) -> A,
    {
        self.rows.iter().fold(init, |acc, row| reducer(acc, row))
    }

    /// Return a copy with every column's type recomputed from the current rows.
    pub fn with_inferred_types(&self, mode: InferenceMode) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                column_type: infer_column_type(self.column_values(&c.id), mode),
                ..c.clone()
            })
            .collect();
        Self {
            columns,
            rows: self.rows.clone(),
        }
    }
}

/// Infer a column type from its values (in row order).
///
/// With [`InferenceMode::FirstRow`] only the first value is inspected; an empty column is a
/// `String` column.
pub fn infer_column_type<'a, I>(values: I, mode: InferenceMode) -> ColumnType
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut values = values.into_iter();
    match mode {
        InferenceMode::FirstRow => match values.next().and_then(Value::as_number) {
            Some(_) => ColumnType::Number,
            None => ColumnType::String,
        },
        InferenceMode::FullScan => {
            let mut seen_numeric = false;
            for v in values.filter(|v| !v.is_missing()) {
                if v.as_number().is_none() {
                    return ColumnType::String;
                }
                seen_numeric = true;
            }
            if seen_numeric {
                ColumnType::Number
            } else {
                ColumnType::String
            }
        }
    }
}

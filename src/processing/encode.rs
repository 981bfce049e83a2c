//! Categorical (label) encoding.

use std::collections::{HashMap, HashSet};

use crate::types::{Dataset, Value, ValueKey};

/// Distinct non-null values of `column` in first-seen order, paired with their code.
///
/// Absent keys and `null` are not categories. The empty string is a category like any other.
pub fn category_codes(dataset: &Dataset, column: &str) -> Vec<(Value, usize)> {
    let mut seen = HashSet::new();
    dataset
        .column_values(column)
        .filter(|v| !v.is_null() && seen.insert(v.key()))
        .enumerate()
        .map(|(code, v)| (v.clone(), code))
        .collect()
}

fn code_table<'a>(dataset: &'a Dataset, column: &'a str) -> HashMap<ValueKey<'a>, usize> {
    let mut codes = HashMap::new();
    for v in dataset.column_values(column).filter(|v| !v.is_null()) {
        let next = codes.len();
        codes.entry(v.key()).or_insert(next);
    }
    codes
}

/// Replace every non-null value in `columns` with its zero-based first-seen category code.
pub fn encode_categorical(dataset: &Dataset, columns: &[String]) -> Dataset {
    let encoders: Vec<(&str, HashMap<ValueKey<'_>, usize>)> = columns
        .iter()
        .map(|c| (c.as_str(), code_table(dataset, c)))
        .collect();

    dataset.map_rows(|row| {
        let mut out = row.clone();
        for (column, codes) in &encoders {
            if let Some(code) = row.get(column).and_then(|v| codes.get(&v.key())) {
                out.insert(*column, Value::Number(*code as f64));
            }
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, ColumnType, Row};

    fn dataset(values: Vec<Value>) -> Dataset {
        let rows = values
            .into_iter()
            .map(|v| [("c", v)].into_iter().collect::<Row>())
            .collect();
        Dataset::new(vec![Column::from_header("c", ColumnType::String)], rows)
    }

    #[test]
    fn codes_follow_first_seen_order() {
        let ds = dataset(vec![
            Value::from("red"),
            Value::from("blue"),
            Value::Null,
            Value::from("red"),
            Value::from("green"),
        ]);
        let out = encode_categorical(&ds, &["c".to_string()]);
        let got: Vec<Value> = out.column_values("c").cloned().collect();
        assert_eq!(
            got,
            vec![
                Value::Number(0.0),
                Value::Number(1.0),
                Value::Null,
                Value::Number(0.0),
                Value::Number(2.0),
            ]
        );
    }

    #[test]
    fn category_listing_matches_encoding() {
        let ds = dataset(vec![Value::from("b"), Value::from("a"), Value::from("b"), Value::from("")]);
        assert_eq!(
            category_codes(&ds, "c"),
            vec![(Value::from("b"), 0), (Value::from("a"), 1), (Value::from(""), 2)]
        );
    }

    #[test]
    fn numbers_and_numeric_text_are_distinct_categories() {
        let ds = dataset(vec![Value::Number(1.0), Value::from("1"), Value::Number(1.0)]);
        let out = encode_categorical(&ds, &["c".to_string()]);
        let got: Vec<Value> = out.column_values("c").cloned().collect();
        assert_eq!(got, vec![Value::Number(0.0), Value::Number(1.0), Value::Number(0.0)]);
    }

    #[test]
    fn absent_keys_stay_absent() {
        let mut ds = dataset(vec![Value::from("x")]);
        ds.rows.push(Row::new());
        let out = encode_categorical(&ds, &["c".to_string()]);
        assert!(out.rows[1].is_empty());
    }
}

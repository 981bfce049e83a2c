//! Missing-value handling.
//!
//! A value is missing when it is `null`, the key is absent from the row, or it is the empty
//! string (ingestion fills empty cells with `""`).

use crate::error::{TransformError, TransformResult};
use crate::types::{Dataset, Value};

use super::operation::MissingValueStrategy;
use super::reduce::{reduce, ReduceOp};

/// Remove or fill missing values in `columns`.
///
/// Fill strategies compute one fill value per column up front and then fill every target
/// column of a row in the same pass. `fill_value` is required by
/// [`MissingValueStrategy::FillValue`] and ignored otherwise.
pub fn handle_missing_values(
    dataset: &Dataset,
    strategy: MissingValueStrategy,
    columns: &[String],
    fill_value: Option<&Value>,
) -> TransformResult<Dataset> {
    if strategy == MissingValueStrategy::Remove {
        return Ok(dataset.filter_rows(|row| columns.iter().all(|c| !row.value(c).is_missing())));
    }

    let fills: Vec<(&str, Value)> = match strategy {
        MissingValueStrategy::FillMean => columns
            .iter()
            .filter_map(|c| {
                let mean = reduce(dataset, c, ReduceOp::Mean).and_then(|v| v.as_number());
                if mean.is_none() {
                    log::debug!("fillMean: column '{c}' has no numeric values; left unchanged");
                }
                mean.map(|m| (c.as_str(), Value::Number(m)))
            })
            .collect(),
        MissingValueStrategy::FillZero => columns
            .iter()
            .map(|c| (c.as_str(), Value::Number(0.0)))
            .collect(),
        MissingValueStrategy::FillValue => {
            let value = fill_value.ok_or_else(|| {
                TransformError::invalid("handleMissingValues", "strategy 'fillValue' requires a 'value'")
            })?;
            columns.iter().map(|c| (c.as_str(), value.clone())).collect()
        }
        MissingValueStrategy::Remove => Vec::new(),
    };

    Ok(dataset.map_rows(|row| {
        let mut out = row.clone();
        for (column, fill) in &fills {
            if row.value(column).is_missing() {
                out.insert(*column, fill.clone());
            }
        }
        out
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, ColumnType, Row};

    fn dataset() -> Dataset {
        let rows = vec![
            [("a", Value::Number(1.0)), ("b", Value::from("x"))].into_iter().collect::<Row>(),
            [("a", Value::Null), ("b", Value::from(""))].into_iter().collect::<Row>(),
            [("a", Value::Number(5.0))].into_iter().collect::<Row>(),
            [("a", Value::from("")), ("b", Value::from("z"))].into_iter().collect::<Row>(),
        ];
        Dataset::new(
            vec![
                Column::from_header("a", ColumnType::Number),
                Column::from_header("b", ColumnType::String),
            ],
            rows,
        )
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn remove_drops_rows_missing_any_target_and_keeps_order() {
        let out = handle_missing_values(&dataset(), MissingValueStrategy::Remove, &cols(&["a", "b"]), None)
            .unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0].value("b"), &Value::from("x"));

        let out = handle_missing_values(&dataset(), MissingValueStrategy::Remove, &cols(&["a"]), None).unwrap();
        let a: Vec<&Value> = out.column_values("a").collect();
        assert_eq!(a, vec![&Value::Number(1.0), &Value::Number(5.0)]);
    }

    #[test]
    fn fill_mean_uses_numeric_values_only() {
        let out = handle_missing_values(&dataset(), MissingValueStrategy::FillMean, &cols(&["a"]), None).unwrap();
        let a: Vec<&Value> = out.column_values("a").collect();
        assert_eq!(
            a,
            vec![&Value::Number(1.0), &Value::Number(3.0), &Value::Number(5.0), &Value::Number(3.0)]
        );
    }

    #[test]
    fn fill_mean_leaves_non_numeric_columns_untouched() {
        let ds = dataset();
        let out = handle_missing_values(&ds, MissingValueStrategy::FillMean, &cols(&["b"]), None).unwrap();
        assert_eq!(out, ds);
    }

    #[test]
    fn fill_zero_fills_absent_keys_too() {
        let out = handle_missing_values(&dataset(), MissingValueStrategy::FillZero, &cols(&["a", "b"]), None)
            .unwrap();
        assert_eq!(out.rows[1].value("a"), &Value::Number(0.0));
        assert_eq!(out.rows[1].value("b"), &Value::Number(0.0));
        assert_eq!(out.rows[2].get("b"), Some(&Value::Number(0.0)));
        assert!(out.rows.iter().all(|r| !r.value("a").is_missing() && !r.value("b").is_missing()));
    }

    #[test]
    fn fill_value_requires_a_value() {
        let err = handle_missing_values(&dataset(), MissingValueStrategy::FillValue, &cols(&["b"]), None)
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidOperationParams { .. }));

        let fill = Value::from("unknown");
        let out = handle_missing_values(&dataset(), MissingValueStrategy::FillValue, &cols(&["b"]), Some(&fill))
            .unwrap();
        let b: Vec<&Value> = out.column_values("b").collect();
        assert_eq!(b, vec![&Value::from("x"), &fill, &fill, &Value::from("z")]);
    }
}

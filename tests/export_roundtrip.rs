use tabular_prep::export::{export, ExportFormat};
use tabular_prep::ingestion::{parse, FormatHint};
use tabular_prep::processing::{apply, Operation};
use tabular_prep::types::{Column, ColumnType, Dataset, Row, Value};

fn people_bytes() -> Vec<u8> {
    std::fs::read("tests/fixtures/people.csv").unwrap()
}

#[test]
fn csv_export_parses_back_to_the_same_dataset() {
    let ds = parse(&people_bytes(), &FormatHint::extension("csv")).unwrap();
    let bytes = export(&ds, ExportFormat::Csv).unwrap();
    let back = parse(&bytes, &FormatHint::mime_type(ExportFormat::Csv.mime_type())).unwrap();
    assert_eq!(back, ds);
}

#[test]
fn headers_with_semicolons_survive_csv_export() {
    let ds = Dataset::new(
        vec![
            Column::from_header("a;b;c", ColumnType::Number),
            Column::from_header("d", ColumnType::Number),
        ],
        vec![[("a;b;c", Value::Number(1.0)), ("d", Value::Number(2.0))]
            .into_iter()
            .collect::<Row>()],
    );
    let bytes = export(&ds, ExportFormat::Csv).unwrap();
    let back = parse(&bytes, &FormatHint::extension("csv")).unwrap();

    let ids: Vec<&str> = back.column_ids().collect();
    assert_eq!(ids, vec!["a;b;c", "d"]);
    assert_eq!(back, ds);
}

#[test]
fn transformed_numbers_survive_csv_export() {
    let ds = parse(b"v\n1\n2\n", &FormatHint::extension("csv")).unwrap();
    let encoded = apply(&ds, &Operation::EncodeCategorical { columns: vec!["v".into()] }).unwrap();
    let text = String::from_utf8(export(&encoded, ExportFormat::Csv).unwrap()).unwrap();
    assert_eq!(text, "v\n0\n1\n");
}

#[cfg(feature = "excel")]
#[test]
fn xlsx_export_parses_back() {
    let ds = parse(&people_bytes(), &FormatHint::extension("csv")).unwrap();
    let bytes = export(&ds, ExportFormat::Xlsx).unwrap();
    let back = parse(&bytes, &FormatHint::extension(ExportFormat::Xlsx.extension())).unwrap();

    assert_eq!(back.columns, ds.columns);
    assert_eq!(back.row_count(), ds.row_count());
    assert_eq!(back.rows[0].value("age"), &Value::Number(36.0));
    assert_eq!(back.rows[1].value("age"), &Value::from(""));
    assert_eq!(back.rows[1].value("city"), &Value::from("New York"));
    assert_eq!(back.column("name").unwrap().column_type, ColumnType::String);
}

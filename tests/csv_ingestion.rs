use tabular_prep::ingestion::csv::{detect_delimiter, ingest_csv_from_bytes, ingest_csv_from_reader};
use tabular_prep::types::{ColumnType, InferenceMode, Value};
use tabular_prep::IngestionError;

fn fixture() -> Vec<u8> {
    std::fs::read("tests/fixtures/people.csv").unwrap()
}

#[test]
fn ingest_people_fixture() {
    let ds = ingest_csv_from_bytes(&fixture(), None, InferenceMode::FirstRow).unwrap();

    assert_eq!(ds.row_count(), 5);
    let ids: Vec<&str> = ds.column_ids().collect();
    assert_eq!(ids, vec!["id", "name", "age", "city"]);
    assert_eq!(ds.column("id").unwrap().column_type, ColumnType::Number);
    assert_eq!(ds.column("name").unwrap().column_type, ColumnType::String);
    assert_eq!(ds.column("age").unwrap().column_type, ColumnType::Number);

    assert_eq!(ds.rows[0].value("name"), &Value::from("Ada"));
    assert_eq!(ds.rows[0].value("age"), &Value::Number(36.0));
    // Empty cells are kept as empty text, not dropped.
    assert_eq!(ds.rows[1].value("age"), &Value::from(""));
    assert_eq!(ds.rows[4].value("city"), &Value::from(""));
}

#[test]
fn header_and_two_rows_round_trip() {
    let ds = ingest_csv_from_bytes(b"A,B\n1,x\n2,y\n", None, InferenceMode::FirstRow).unwrap();
    assert_eq!(ds.columns[0].name, "A");
    assert_eq!(ds.columns[0].column_type, ColumnType::Number);
    assert_eq!(ds.columns[1].column_type, ColumnType::String);
    assert_eq!(ds.rows[0].value("A"), &Value::Number(1.0));
    assert_eq!(ds.rows[0].value("B"), &Value::from("x"));
    assert_eq!(ds.rows[1].value("A"), &Value::Number(2.0));
    assert_eq!(ds.rows[1].value("B"), &Value::from("y"));
}

#[test]
fn first_row_inference_vs_full_scan() {
    let input = b"code\n1\nA7\n";
    let first = ingest_csv_from_bytes(input, None, InferenceMode::FirstRow).unwrap();
    assert_eq!(first.columns[0].column_type, ColumnType::Number);

    let full = ingest_csv_from_bytes(input, None, InferenceMode::FullScan).unwrap();
    assert_eq!(full.columns[0].column_type, ColumnType::String);
    // Values are never coerced by the column type.
    assert_eq!(full.rows[1].value("code"), &Value::from("A7"));
}

#[test]
fn semicolon_files_and_bom_are_handled() {
    let input = b"\xEF\xBB\xBFname;score\nAda;9.5\n";
    assert_eq!(detect_delimiter(&input[3..]), b';');

    let ds = ingest_csv_from_bytes(input, None, InferenceMode::FirstRow).unwrap();
    assert_eq!(ds.columns[0].id, "name");
    assert_eq!(ds.rows[0].value("score"), &Value::Number(9.5));
}

#[test]
fn explicit_delimiter_overrides_detection() {
    let ds = ingest_csv_from_bytes(b"a|b,c\n1|2,3\n", Some(b'|'), InferenceMode::FirstRow).unwrap();
    let ids: Vec<&str> = ds.column_ids().collect();
    assert_eq!(ids, vec!["a", "b,c"]);
    assert_eq!(ds.rows[0].value("b,c"), &Value::from("2,3"));
}

#[test]
fn ragged_rows_are_padded_with_empty_text() {
    let ds = ingest_csv_from_bytes(b"a,b,c\n1\n2,3,4,5\n", None, InferenceMode::FirstRow).unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0].value("c"), &Value::from(""));
    assert_eq!(ds.rows[1].value("c"), &Value::Number(4.0));
}

#[test]
fn header_only_keeps_the_catalog() {
    let ds = ingest_csv_from_bytes(b"a,b\n", None, InferenceMode::FirstRow).unwrap();
    assert_eq!(ds.row_count(), 0);
    let ids: Vec<&str> = ds.column_ids().collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn blank_headers_get_generated_names() {
    let ds = ingest_csv_from_bytes(b",\n1,2\n", None, InferenceMode::FirstRow).unwrap();
    let ids: Vec<&str> = ds.column_ids().collect();
    assert_eq!(ids, vec!["Column1", "Column2"]);
    assert_eq!(ds.rows[0].value("Column2"), &Value::Number(2.0));
}

#[test]
fn repeated_and_trailing_blank_headers_keep_every_value() {
    let ds = ingest_csv_from_bytes(b"A,A,\n1,2,3\n", None, InferenceMode::FirstRow).unwrap();
    let ids: Vec<&str> = ds.column_ids().collect();
    assert_eq!(ids, vec!["A", "A_2", "Column3"]);
    assert_eq!(ds.rows[0].value("A"), &Value::Number(1.0));
    assert_eq!(ds.rows[0].value("A_2"), &Value::Number(2.0));
    assert_eq!(ds.rows[0].value("Column3"), &Value::Number(3.0));
}

#[test]
fn empty_input_is_an_empty_sheet() {
    let err = ingest_csv_from_bytes(b"", None, InferenceMode::FirstRow).unwrap_err();
    assert!(matches!(err, IngestionError::EmptySheet { .. }));
}

#[test]
fn ingest_from_existing_reader_uses_its_headers() {
    let input = "name\tid\nAda\t1\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .from_reader(input.as_bytes());

    let ds = ingest_csv_from_reader(&mut rdr, InferenceMode::FirstRow).unwrap();
    assert_eq!(ds.row_count(), 1);
    assert_eq!(ds.rows[0].value("id"), &Value::Number(1.0));
    assert_eq!(ds.rows[0].value("name"), &Value::from("Ada"));
}

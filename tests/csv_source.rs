use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use network_ingest::ErrorKind;
use network_ingest::artifact::write_csv;
use network_ingest::ingestion::csv::convert_csv;
use network_ingest::ingestion::{Document, documents_to_dataset};
use network_ingest::types::{DataSet, DataType, Field, Schema, Value};

const FIXTURE: &str = "tests/fixtures/phishing_sample.csv";

fn tmp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("network-ingest-csv-{tag}-{nanos}"))
}

#[test]
fn convert_csv_reads_fixture_in_row_order() {
    let ds = convert_csv(FIXTURE).unwrap();

    assert_eq!(ds.row_count(), 10);
    let names: Vec<&str> = ds.schema.field_names().collect();
    assert_eq!(names[0], "having_IP_Address");
    assert_eq!(names[6], "Result");
    assert!(ds.schema.fields.iter().all(|f| f.data_type == DataType::Int64));
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Int64(-1),
            Value::Int64(1),
            Value::Int64(1),
            Value::Int64(1),
            Value::Int64(-1),
            Value::Int64(-1),
            Value::Int64(-1),
        ]
    );
    // "na" cells are null markers.
    assert_eq!(ds.rows[7][4], Value::Null);
    assert_eq!(ds.rows[9][5], Value::Null);
}

#[test]
fn convert_csv_missing_file_is_source_unavailable() {
    let err = convert_csv("tests/fixtures/does_not_exist.csv").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    assert!(err.to_string().contains("does_not_exist.csv"));
}

#[test]
fn write_then_read_round_trips_scalar_values() {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("url", DataType::Utf8),
        Field::new("score", DataType::Float64),
        Field::new("flag", DataType::Bool),
        Field::new("note", DataType::Utf8),
        Field::new("code", DataType::Utf8),
    ]);
    let ds = DataSet::new(
        schema.clone(),
        vec![
            vec![
                Value::Int64(1),
                Value::Utf8("http://a.example/x,y".to_string()),
                Value::Float64(1.0),
                Value::Bool(true),
                Value::Utf8("say \"hi\"".to_string()),
                Value::Utf8("007".to_string()),
            ],
            vec![
                Value::Int64(-7),
                Value::Utf8("plain".to_string()),
                Value::Float64(0.125),
                Value::Null,
                Value::Utf8("multi\nline".to_string()),
                Value::Utf8("010".to_string()),
            ],
            vec![
                Value::Null,
                Value::Null,
                Value::Float64(-3.5e-9),
                Value::Bool(false),
                Value::Null,
                Value::Null,
            ],
        ],
    );

    let dir = tmp_dir("roundtrip");
    let path = dir.join("data.csv");
    write_csv(&ds, &path).unwrap();
    let back = convert_csv(&path).unwrap();

    assert_eq!(back.schema, schema);
    assert_eq!(back.rows, ds.rows);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn documents_and_their_csv_export_agree() {
    let docs: Vec<Document> = [
        serde_json::json!({"n": 1, "label": "a", "zip": "007"}),
        serde_json::json!({"n": 2.5, "label": 3, "zip": "010"}),
    ]
    .iter()
    .map(|v| v.as_object().cloned().unwrap())
    .collect();
    let from_docs = documents_to_dataset(&docs);
    assert_eq!(from_docs.rows[0][0], Value::Float64(1.0));
    assert_eq!(from_docs.rows[1][1], Value::Utf8("3".to_string()));

    let dir = tmp_dir("docs");
    let path = dir.join("docs.csv");
    write_csv(&from_docs, &path).unwrap();
    let back = convert_csv(&path).unwrap();

    assert_eq!(back, from_docs);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn write_csv_overwrites_and_creates_directories() {
    let dir = tmp_dir("nested");
    let path = dir.join("a").join("b").join("out.csv");
    let ds = convert_csv(FIXTURE).unwrap();

    write_csv(&ds, &path).unwrap();
    write_csv(&ds, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 11);
    assert!(text.starts_with("having_IP_Address,URL_Length,"));

    let _ = fs::remove_dir_all(&dir);
}

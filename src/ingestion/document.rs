//! Conversion of store documents into a [`DataSet`].
//!
//! Documents are JSON objects (`serde_json::Map`). Store drivers render their native documents
//! as JSON before handing them over, so this is the only place that maps documents to rows.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::processing::clean::NULL_SENTINEL;
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// A store document.
pub type Document = JsonMap<String, JsonValue>;

/// Build a [`DataSet`] from documents, preserving document order.
///
/// Columns appear in the order their keys are first seen across all documents. A key missing
/// from a document yields [`Value::Null`] in that row, as does the `"na"` sentinel. Each column's
/// type is the widest type of its non-null values, and every cell is converted to that type, so
/// the result matches what the CSV reader produces for the same data.
pub fn documents_to_dataset(documents: &[Document]) -> DataSet {
    let mut names: Vec<&str> = Vec::new();
    for doc in documents {
        for key in doc.keys() {
            if !names.contains(&key.as_str()) {
                names.push(key.as_str());
            }
        }
    }

    let rows: Vec<Vec<Value>> = documents
        .iter()
        .map(|doc| {
            names
                .iter()
                .map(|name| match doc.get(*name).map(Value::from_json) {
                    Some(Value::Utf8(s)) if s == NULL_SENTINEL => Value::Null,
                    Some(v) => v,
                    None => Value::Null,
                })
                .collect()
        })
        .collect();

    // All-null columns carry no type information.
    let fields = names.iter().map(|name| Field::new(*name, DataType::Utf8)).collect();
    let mut dataset = DataSet::new(Schema::new(fields), rows);
    dataset.widen_column_types();
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: JsonValue) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn columns_follow_first_observed_order() {
        let docs = vec![
            doc(json!({"_id": {"$oid": "65f0"}, "b": 1, "a": "x"})),
            doc(json!({"a": "y", "c": true, "b": 2})),
        ];
        let ds = documents_to_dataset(&docs);
        let names: Vec<&str> = ds.schema.field_names().collect();
        assert_eq!(names, vec!["_id", "b", "a", "c"]);
        assert_eq!(ds.rows[0][3], Value::Null);
        assert_eq!(ds.rows[1][0], Value::Null);
        assert_eq!(ds.rows[1][1], Value::Int64(2));
    }

    #[test]
    fn column_types_widen_across_documents() {
        let docs = vec![
            doc(json!({"n": 1, "m": 1, "s": null, "t": true})),
            doc(json!({"n": 2.5, "m": "na", "s": null, "t": "x"})),
        ];
        let ds = documents_to_dataset(&docs);
        let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
        assert_eq!(
            types,
            vec![DataType::Float64, DataType::Int64, DataType::Utf8, DataType::Utf8]
        );
        // Cells follow the widened column type.
        assert_eq!(ds.rows[0][0], Value::Float64(1.0));
        assert_eq!(ds.rows[1][0], Value::Float64(2.5));
        assert_eq!(ds.rows[0][3], Value::Utf8("true".to_string()));
        // The sentinel is a null and does not widen its column.
        assert_eq!(ds.rows[1][1], Value::Null);
    }

    #[test]
    fn sentinel_match_is_exact() {
        let docs = vec![doc(json!({"v": " na "})), doc(json!({"v": "NA"}))];
        let ds = documents_to_dataset(&docs);
        assert_eq!(ds.rows[0][0], Value::Utf8(" na ".to_string()));
        assert_eq!(ds.rows[1][0], Value::Utf8("NA".to_string()));
    }

    #[test]
    fn no_documents_no_columns() {
        let ds = documents_to_dataset(&[]);
        assert!(ds.is_empty());
        assert_eq!(ds.column_count(), 0);
    }
}

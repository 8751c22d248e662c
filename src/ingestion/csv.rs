//! CSV source: reads a delimited file into a [`DataSet`].

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::processing::clean::NULL_SENTINEL;
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Read a CSV file into an in-memory [`DataSet`], preserving row order.
///
/// Rules:
///
/// - The first row is the header; its names become the schema, in file order.
/// - Each column's type is inferred from its non-null cells: `Int64` if every cell is an
///   integer, `Float64` if every cell is numeric, `Bool` for `true`/`false`, otherwise `Utf8`.
///   Only canonical spellings count (`7`, `2.5`, `true`); `007` or ` 7` make the column `Utf8`.
/// - Empty cells and the exact `"na"` sentinel become [`Value::Null`]; cells are not trimmed.
/// - Rows with a different number of cells than the header are rejected.
pub fn convert_csv(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| {
            IngestionError::source_unavailable(format!("cannot open '{}'", path.display()), e)
        })?;
    convert_csv_from_reader(&mut rdr).map_err(|e| match e {
        IngestionError::SourceUnavailable { message, source } => IngestionError::SourceUnavailable {
            message: format!("{message} (file '{}')", path.display()),
            source,
        },
        other => other,
    })
}

/// Read CSV data from an existing CSV reader.
pub fn convert_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<DataSet> {
    let headers = rdr
        .headers()
        .map_err(|e| IngestionError::source_unavailable("cannot read csv header", e))?
        .clone();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result.map_err(|e| {
            IngestionError::source_unavailable(format!("cannot parse csv row {user_row}"), e)
        })?;
        raw_rows.push(record.iter().map(str::to_owned).collect());
    }

    let fields: Vec<Field> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            Field::new(
                name,
                infer_column_type(raw_rows.iter().map(|r| r[idx].as_str())),
            )
        })
        .collect();

    let rows = raw_rows
        .iter()
        .map(|raw| {
            fields
                .iter()
                .zip(raw.iter())
                .map(|(field, cell)| parse_typed_value(field.data_type, cell))
                .collect()
        })
        .collect();

    Ok(DataSet::new(Schema::new(fields), rows))
}

fn is_null_cell(cell: &str) -> bool {
    cell.is_empty() || cell == NULL_SENTINEL
}

// A cell is numeric or boolean only when that value writes back as the same text, so strings
// such as "007", " 7" or "1e3" stay strings and `write_csv` output reads back unchanged.
fn cell_type(cell: &str) -> DataType {
    if parse_int(cell).is_some() {
        DataType::Int64
    } else if parse_float(cell).is_some() {
        DataType::Float64
    } else if parse_bool(cell).is_some() {
        DataType::Bool
    } else {
        DataType::Utf8
    }
}

fn infer_column_type<'a>(cells: impl Iterator<Item = &'a str>) -> DataType {
    let mut inferred: Option<DataType> = None;
    for cell in cells {
        if is_null_cell(cell) {
            continue;
        }
        let t = cell_type(cell);
        let widened = inferred.map_or(t, |cur| cur.widen(t));
        if widened == DataType::Utf8 {
            return DataType::Utf8;
        }
        inferred = Some(widened);
    }
    // All-null columns carry no type information.
    inferred.unwrap_or(DataType::Utf8)
}

fn parse_typed_value(data_type: DataType, raw: &str) -> Value {
    if is_null_cell(raw) {
        return Value::Null;
    }

    // The column type was inferred from these same cells, so the numeric/bool parses succeed.
    let parsed = match data_type {
        DataType::Int64 => parse_int(raw).map(Value::Int64),
        DataType::Float64 => parse_float(raw).map(Value::Float64),
        DataType::Bool => parse_bool(raw).map(Value::Bool),
        DataType::Utf8 => None,
    };
    parsed.unwrap_or_else(|| Value::Utf8(raw.to_owned()))
}

fn parse_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().filter(|i| i.to_string() == s)
}

// Integers are accepted too, for int cells inside a float column.
fn parse_float(s: &str) -> Option<f64> {
    if let Some(i) = parse_int(s) {
        return Some(i as f64);
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && (format!("{f:?}") == s || f.to_string() == s))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> IngestionResult<DataSet> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes());
        convert_csv_from_reader(&mut rdr)
    }

    #[test]
    fn infers_column_types() {
        let ds = read("a,b,c,d\n1,1.5,true,x\n2,2,false,3\n").unwrap();
        let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
        assert_eq!(
            types,
            vec![DataType::Int64, DataType::Float64, DataType::Bool, DataType::Utf8]
        );
        assert_eq!(ds.rows[1][1], Value::Float64(2.0));
        assert_eq!(ds.rows[1][2], Value::Bool(false));
        assert_eq!(ds.rows[1][3], Value::Utf8("3".to_string()));
    }

    #[test]
    fn empty_and_sentinel_cells_are_null_and_do_not_affect_typing() {
        let ds = read("a,b\n1,na\nna,\n3,4\n").unwrap();
        assert_eq!(ds.schema.fields[0].data_type, DataType::Int64);
        assert_eq!(ds.schema.fields[1].data_type, DataType::Int64);
        assert_eq!(ds.rows[0], vec![Value::Int64(1), Value::Null]);
        assert_eq!(ds.rows[1], vec![Value::Null, Value::Null]);
    }

    #[test]
    fn non_canonical_spellings_stay_text() {
        let ds = read("zip,pad,exp,flag\n007,\" 7\",1e3,False\n010,8,2.0,true\n").unwrap();
        assert!(ds.schema.fields.iter().all(|f| f.data_type == DataType::Utf8));
        assert_eq!(ds.rows[0][0], Value::Utf8("007".to_string()));
        assert_eq!(ds.rows[0][1], Value::Utf8(" 7".to_string()));
        assert_eq!(ds.rows[1][1], Value::Utf8("8".to_string()));
    }

    #[test]
    fn sentinel_is_matched_without_trimming() {
        let ds = read("v\nna\n\" na \"\nNA\n").unwrap();
        assert_eq!(ds.rows[0][0], Value::Null);
        assert_eq!(ds.rows[1][0], Value::Utf8(" na ".to_string()));
        assert_eq!(ds.rows[2][0], Value::Utf8("NA".to_string()));
    }

    #[test]
    fn quoted_cells_keep_delimiters() {
        let ds = read("name,url\n\"Doe, Jane\",http://a.b\n").unwrap();
        assert_eq!(ds.rows[0][0], Value::Utf8("Doe, Jane".to_string()));
    }

    #[test]
    fn ragged_rows_are_source_unavailable() {
        let err = read("a,b\n1,2\n3\n").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::SourceUnavailable);
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn header_only_yields_empty_dataset() {
        let ds = read("a,b\n").unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.column_count(), 2);
    }
}

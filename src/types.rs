//! Core data model: the in-memory tabular record set.
//!
//! Sources (document store, CSV) are converted into a [`DataSet`]: an ordered list of rows whose
//! columns are described by a [`Schema`]. Column order is the order in which field names were
//! first observed in the source.

use std::fmt;

use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// Narrowest type able to hold values of both `self` and `other`.
    pub fn widen(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
                DataType::Float64
            }
            _ => DataType::Utf8,
        }
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single scalar value in a [`DataSet`]. [`Value::Null`] is the null marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The data type of a non-null value.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Utf8(_) => Some(DataType::Utf8),
        }
    }

    /// Convert a JSON scalar into a value. Nested arrays/objects are kept as compact JSON text.
    pub fn from_json(v: &JsonValue) -> Self {
        match v {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int64(i),
                None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
            },
            JsonValue::String(s) => Value::Utf8(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => Value::Utf8(v.to_string()),
        }
    }

    /// Convert into a column of type `data_type`.
    ///
    /// Integers widen to floats and every scalar widens to text (its CSV cell form). Nulls, values
    /// already of `data_type`, and conversions that would narrow are returned unchanged.
    pub fn coerce(self, data_type: DataType) -> Value {
        match (self, data_type) {
            (Value::Int64(v), DataType::Float64) => Value::Float64(v as f64),
            (v @ (Value::Int64(_) | Value::Float64(_) | Value::Bool(_)), DataType::Utf8) => {
                Value::Utf8(v.to_string())
            }
            (v, _) => v,
        }
    }

    /// Convert into a JSON value. Non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Int64(v) => JsonValue::from(*v),
            Value::Float64(v) => JsonNumber::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Bool(v) => JsonValue::Bool(*v),
            Value::Utf8(v) => JsonValue::String(v.clone()),
        }
    }
}

/// Textual cell representation used by the CSV writer.
///
/// Floats use the shortest round-trip form and always carry a decimal point or exponent, so a
/// written `Float64(1.0)` reads back as `1.0` rather than as an integer.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v:?}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => f.write_str(v),
        }
    }
}

/// In-memory tabular dataset (the record set owned by one ingestion run).
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the named column, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Remove a column by name. Returns `true` if the column existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.schema.index_of(name) else {
            return false;
        };
        self.schema.fields.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Set each column's type to the widest type of its non-null cells and convert the cells to it.
    ///
    /// All-null columns keep their current type.
    pub fn widen_column_types(&mut self) {
        for (idx, field) in self.schema.fields.iter_mut().enumerate() {
            let Some(data_type) = self
                .rows
                .iter()
                .filter_map(|row| row[idx].data_type())
                .reduce(DataType::widen)
            else {
                continue;
            };
            field.data_type = data_type;
            for row in &mut self.rows {
                let cell = std::mem::replace(&mut row[idx], Value::Null);
                row[idx] = cell.coerce(data_type);
            }
        }
    }

    /// Apply `f` to every cell in place.
    pub fn map_values<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Value),
    {
        for cell in self.rows.iter_mut().flatten() {
            f(cell);
        }
    }

    /// Create a new dataset holding the rows at `indices`, in that order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Convert every row into a JSON object keyed by field name.
    pub fn to_documents(&self) -> Vec<JsonMap<String, JsonValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.schema
                    .field_names()
                    .zip(row.iter())
                    .map(|(name, v)| (name.to_string(), v.to_json()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("_id", DataType::Utf8),
            Field::new("having_IP_Address", DataType::Int64),
            Field::new("Result", DataType::Int64),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![Value::Utf8("a".into()), Value::Int64(-1), Value::Int64(1)],
                vec![Value::Utf8("b".into()), Value::Int64(1), Value::Int64(-1)],
                vec![Value::Utf8("c".into()), Value::Null, Value::Int64(1)],
            ],
        )
    }

    #[test]
    fn drop_column_removes_field_and_cells() {
        let mut ds = sample();
        assert!(ds.drop_column("_id"));
        assert!(!ds.drop_column("_id"));
        assert_eq!(ds.schema.index_of("_id"), None);
        assert_eq!(ds.column_count(), 2);
        assert!(ds.rows.iter().all(|r| r.len() == 2));
        assert_eq!(ds.rows[0], vec![Value::Int64(-1), Value::Int64(1)]);
    }

    #[test]
    fn select_rows_follows_index_order() {
        let ds = sample();
        let out = ds.select_rows(&[2, 0]);
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.rows[0][0], Value::Utf8("c".into()));
        assert_eq!(out.rows[1][0], Value::Utf8("a".into()));
        assert_eq!(out.schema, ds.schema);
    }

    #[test]
    fn float_display_keeps_decimal_point() {
        assert_eq!(Value::Float64(1.0).to_string(), "1.0");
        assert_eq!(Value::Float64(0.25).to_string(), "0.25");
        assert_eq!(Value::Int64(7).to_string(), "7");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn widen_numeric_and_mixed() {
        assert_eq!(DataType::Int64.widen(DataType::Float64), DataType::Float64);
        assert_eq!(DataType::Bool.widen(DataType::Int64), DataType::Utf8);
        assert_eq!(DataType::Bool.widen(DataType::Bool), DataType::Bool);
    }

    #[test]
    fn widening_converts_cells_to_the_column_type() {
        let mut ds = DataSet::new(
            Schema::new(vec![
                Field::new("n", DataType::Utf8),
                Field::new("mixed", DataType::Utf8),
                Field::new("empty", DataType::Int64),
            ]),
            vec![
                vec![Value::Int64(1), Value::Bool(true), Value::Null],
                vec![Value::Float64(2.5), Value::Int64(3), Value::Null],
            ],
        );
        ds.widen_column_types();

        let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
        assert_eq!(types, vec![DataType::Float64, DataType::Utf8, DataType::Int64]);
        assert_eq!(
            ds.rows,
            vec![
                vec![Value::Float64(1.0), Value::Utf8("true".into()), Value::Null],
                vec![Value::Float64(2.5), Value::Utf8("3".into()), Value::Null],
            ]
        );
    }

    #[test]
    fn json_conversion_of_scalars_and_nested() {
        assert_eq!(Value::from_json(&serde_json::json!(3)), Value::Int64(3));
        assert_eq!(Value::from_json(&serde_json::json!(3.5)), Value::Float64(3.5));
        assert_eq!(Value::from_json(&serde_json::json!(null)), Value::Null);
        assert_eq!(
            Value::from_json(&serde_json::json!({"$oid": "x"})),
            Value::Utf8(r#"{"$oid":"x"}"#.to_string())
        );
        assert_eq!(Value::Float64(f64::NAN).to_json(), JsonValue::Null);
    }

    #[test]
    fn to_documents_keys_by_field_name() {
        let docs = sample().to_documents();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[2]["having_IP_Address"], JsonValue::Null);
        assert_eq!(docs[0]["Result"], serde_json::json!(1));
    }
}

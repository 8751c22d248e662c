//! Common post-processing applied to every source.

use crate::types::{DataSet, Value};

/// Identifier field generated by the document store.
pub const IDENTIFIER_FIELD: &str = "_id";

/// Literal cell value treated as missing.
pub const NULL_SENTINEL: &str = "na";

/// Drop the identifier column and normalize the `"na"` sentinel to [`Value::Null`].
///
/// Column types are recomputed from the remaining non-null values, so a numeric column that only
/// looked textual because of the sentinel is reported with its numeric type. Cells are converted to
/// their column's type. Cleaning an already clean dataset is a no-op.
pub fn clean(mut dataset: DataSet) -> DataSet {
    dataset.drop_column(IDENTIFIER_FIELD);
    dataset.map_values(|cell| {
        if matches!(cell, Value::Utf8(s) if s == NULL_SENTINEL) {
            *cell = Value::Null;
        }
    });
    dataset.widen_column_types();
    dataset
}

/// Whether `dataset` has no identifier column and no sentinel cells.
pub fn is_clean(dataset: &DataSet) -> bool {
    dataset.schema.index_of(IDENTIFIER_FIELD).is_none()
        && !dataset
            .rows
            .iter()
            .flatten()
            .any(|v| matches!(v, Value::Utf8(s) if s == NULL_SENTINEL))
}

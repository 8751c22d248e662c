//! In-memory transformations applied between fetch and persistence.
//!
//! - [`clean()`]: drops the store identifier and normalizes the `"na"` sentinel
//! - [`train_test_split()`]: reproducible seeded partition into train/test subsets
//!
//! ```rust
//! use network_ingest::processing::{clean, train_test_split};
//! use network_ingest::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("_id", DataType::Utf8),
//!     Field::new("URL_Length", DataType::Utf8),
//! ]);
//! let rows = (0..10)
//!     .map(|i| vec![Value::Utf8(format!("id{i}")), Value::Utf8("na".to_string())])
//!     .collect();
//! let ds = clean(DataSet::new(schema, rows));
//! assert_eq!(ds.schema.index_of("_id"), None);
//! assert!(ds.rows.iter().all(|r| r[0] == Value::Null));
//!
//! let split = train_test_split(&ds, 0.2).unwrap();
//! assert_eq!((split.train.row_count(), split.test.row_count()), (8, 2));
//! ```

pub mod clean;
pub mod split;

pub use clean::{clean, is_clean, IDENTIFIER_FIELD, NULL_SENTINEL};
pub use split::{split_counts, split_with_seed, train_test_split, TrainTestSplit, SPLIT_SEED};

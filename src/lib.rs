//! `network-ingest` is the data-ingestion stage of a network-security model-training pipeline.
//!
//! It reads tabular records from a document store (or a CSV seed file), normalizes them into an
//! in-memory [`types::DataSet`], persists a feature-store snapshot, and splits that snapshot into
//! training and testing CSV files. The result of a run is a [`artifact::DataIngestionArtifact`]
//! holding the two file paths.
//!
//! ## Pipeline
//!
//! ```text
//! fetch ──► clean ──► snapshot (feature store CSV) ──► split ──► persist split (train/test CSV)
//! ```
//!
//! - **fetch**: every document of the configured collection, or every row of a CSV file.
//!   An empty source is an error, never an empty artifact.
//! - **clean**: drops the store identifier (`_id`) and maps the `"na"` sentinel to
//!   [`types::Value::Null`].
//! - **snapshot**: written before splitting and left on disk if a later stage fails.
//! - **split**: seeded with [`processing::SPLIT_SEED`], so identical input gives identical
//!   partitions; `test_count = round(ratio * total)`.
//!
//! Any failure is returned as an [`error::PipelineError`] carrying the error kind, the stage and
//! the location involved.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use network_ingest::config::DataIngestionConfig;
//! use network_ingest::ingestion::{DataIngestion, MemoryObserver, MemoryStore, StoreSource};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), network_ingest::PipelineError> {
//! let docs = (0..10)
//!     .map(|i| json!({"_id": i, "URL_Length": i % 3, "Result": (i % 2) * 2 - 1}))
//!     .map(|v| v.as_object().cloned().unwrap())
//!     .collect();
//! let store = MemoryStore::new().with_collection("MISHALAI", "Network_Data", docs);
//!
//! let out = std::env::temp_dir().join("network-ingest-doc-example");
//! let config = DataIngestionConfig::new(
//!     "MISHALAI",
//!     "Network_Data",
//!     out.join("feature_store").join("phisingData.csv"),
//!     out.join("ingested").join("train.csv"),
//!     out.join("ingested").join("test.csv"),
//!     0.2,
//! );
//!
//! let artifact = DataIngestion::new(config, StoreSource::new(store))
//!     .with_observer(Arc::new(MemoryObserver::new()))
//!     .initiate_data_ingestion()?;
//! assert!(artifact.trained_file_path().ends_with("train.csv"));
//! # let _ = std::fs::remove_dir_all(&out);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: record sources, document store traits, observers and the orchestrator
//! - [`processing`]: cleaning and the train/test split
//! - [`artifact`]: CSV writer and the ingestion artifact
//! - [`config`]: ingestion configuration and store settings
//! - [`types`]: in-memory dataset types
//! - [`error`]: error types

pub mod artifact;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use artifact::{DataIngestionArtifact, write_csv};
pub use config::{DataIngestionConfig, StoreSettings, TrainingPipelineConfig};
pub use error::{ErrorKind, IngestionError, IngestionResult, PipelineError, PipelineResult};

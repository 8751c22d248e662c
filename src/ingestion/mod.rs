//! Record sources, event sinks and the ingestion orchestrator.
//!
//! Most callers should build a [`DataIngestion`] over a [`RecordSource`] and call
//! [`DataIngestion::initiate_data_ingestion`], which:
//!
//! - fetches raw records from the source (a document store via [`StoreSource`], or a CSV file via
//!   [`CsvSource`])
//! - cleans them, writes the feature-store snapshot, splits and writes train/test files
//! - reports every stage to an optional [`IngestionObserver`]
//!
//! Source-specific functions are also available under:
//! - [`csv`]
//! - [`store`] (with [`memory`] and, behind the `mongo` feature, `mongo`)

pub mod csv;
pub mod document;
pub mod memory;
#[cfg(feature = "mongo")]
pub mod mongo;
pub mod observability;
pub mod pipeline;
pub mod store;

pub use document::{Document, documents_to_dataset};
pub use memory::MemoryStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoStore;
pub use observability::{
    CompositeObserver, FileObserver, IngestionObserver, IngestionSeverity, MemoryObserver, StdErrObserver,
    TracingObserver,
};
pub use pipeline::{CsvSource, DataIngestion, RecordSource, Stage, StoreSource};
pub use store::{
    ConnectionScope, DocumentStore, StoreConnection, fetch_from_store, ping_store, seed_from_csv, with_connection,
};

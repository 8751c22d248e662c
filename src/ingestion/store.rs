//! Document-store source.
//!
//! The store itself (driver, authentication, query execution) sits behind two traits:
//! [`DocumentStore`] opens connections and [`StoreConnection`] runs queries on one. Every use of a
//! connection goes through [`ConnectionScope`], which closes it on every exit path.

use std::path::Path;

use crate::config::DataIngestionConfig;
use crate::error::{IngestionError, IngestionResult};
use crate::processing::clean;
use crate::types::DataSet;

use super::csv::convert_csv;
use super::document::{Document, documents_to_dataset};
use super::observability::{IngestionObserver, IngestionSeverity, emit};

/// A document store that can hand out connections.
pub trait DocumentStore {
    type Connection: StoreConnection;

    /// Open a new connection. Fails with `SourceUnavailable` when the store cannot be reached.
    fn connect(&self) -> IngestionResult<Self::Connection>;

    /// Human-readable store address for logs; must not contain credentials.
    fn describe(&self) -> String;
}

/// An open connection to a [`DocumentStore`].
pub trait StoreConnection {
    /// Every document of `database.collection`, in store-native order.
    fn find_all(&mut self, database: &str, collection: &str) -> IngestionResult<Vec<Document>>;

    /// At most `limit` documents of `database.collection`.
    fn sample(&mut self, database: &str, collection: &str, limit: usize) -> IngestionResult<Vec<Document>> {
        let mut docs = self.find_all(database, collection)?;
        docs.truncate(limit);
        Ok(docs)
    }

    /// Insert `documents` and return how many were inserted.
    fn insert_many(&mut self, database: &str, collection: &str, documents: Vec<Document>) -> IngestionResult<usize>;

    /// Release the connection.
    fn close(&mut self);
}

/// Scoped acquisition of a store connection; the connection is closed when the scope drops.
pub struct ConnectionScope<'a, C: StoreConnection> {
    connection: C,
    observer: Option<&'a dyn IngestionObserver>,
}

impl<'a, C: StoreConnection> ConnectionScope<'a, C> {
    /// Connect to `store`, reporting the attempt to `observer`.
    pub fn open<S>(store: &S, observer: Option<&'a dyn IngestionObserver>) -> IngestionResult<Self>
    where
        S: DocumentStore<Connection = C>,
    {
        emit(
            observer,
            IngestionSeverity::Info,
            &format!("connecting to document store at {}", store.describe()),
        );
        let connection = store.connect()?;
        Ok(Self { connection, observer })
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }
}

impl<C: StoreConnection> Drop for ConnectionScope<'_, C> {
    fn drop(&mut self) {
        self.connection.close();
        emit(self.observer, IngestionSeverity::Info, "document store connection closed");
    }
}

/// Run `f` on a fresh connection to `store`; the connection is released whether `f` succeeds or not.
pub fn with_connection<S, T, F>(store: &S, observer: Option<&dyn IngestionObserver>, f: F) -> IngestionResult<T>
where
    S: DocumentStore,
    F: FnOnce(&mut S::Connection) -> IngestionResult<T>,
{
    let mut scope = ConnectionScope::open(store, observer)?;
    let result = f(scope.connection());
    drop(scope);
    result
}

/// Fetch every document of the configured collection as a cleaned [`DataSet`].
///
/// Fails with `SourceUnavailable` if the store cannot be reached or queried, and with
/// `EmptySource` if the collection holds no documents or only identifier fields.
pub fn fetch_from_store<S: DocumentStore>(
    store: &S,
    config: &DataIngestionConfig,
    observer: Option<&dyn IngestionObserver>,
) -> IngestionResult<DataSet> {
    let namespace = config.namespace();
    let documents = with_connection(store, observer, |conn| {
        conn.find_all(config.database_name(), config.collection_name())
    })?;
    emit(
        observer,
        IngestionSeverity::Info,
        &format!("fetched {} records from {namespace}", documents.len()),
    );

    if documents.is_empty() {
        return Err(IngestionError::empty_source(format!(
            "no documents found in collection {namespace}"
        )));
    }

    let dataset = clean(documents_to_dataset(&documents));
    emit(
        observer,
        IngestionSeverity::Info,
        &format!(
            "dataset shape after cleaning: ({}, {})",
            dataset.row_count(),
            dataset.column_count()
        ),
    );
    if dataset.column_count() == 0 {
        return Err(IngestionError::empty_source(format!(
            "documents in collection {namespace} have no fields besides the identifier"
        )));
    }
    Ok(dataset)
}

/// Load a CSV seed file into `database.collection` and return the number of inserted documents.
///
/// Cells that read as null (empty or `"na"`) are stored as document nulls.
pub fn seed_from_csv<S: DocumentStore>(
    store: &S,
    csv_path: impl AsRef<Path>,
    database: &str,
    collection: &str,
    observer: Option<&dyn IngestionObserver>,
) -> IngestionResult<usize> {
    let csv_path = csv_path.as_ref();
    let dataset = convert_csv(csv_path)?;
    if dataset.is_empty() {
        return Err(IngestionError::empty_source(format!(
            "csv file '{}' has no records",
            csv_path.display()
        )));
    }
    let documents = dataset.to_documents();
    emit(
        observer,
        IngestionSeverity::Info,
        &format!("converted {} records from csv '{}'", documents.len(), csv_path.display()),
    );

    let inserted = with_connection(store, observer, |conn| {
        conn.insert_many(database, collection, documents)
    })?;
    emit(
        observer,
        IngestionSeverity::Info,
        &format!("inserted {inserted} records into {database}.{collection}"),
    );
    Ok(inserted)
}

/// Connectivity smoke test: connect and read up to `limit` documents.
pub fn ping_store<S: DocumentStore>(
    store: &S,
    database: &str,
    collection: &str,
    limit: usize,
    observer: Option<&dyn IngestionObserver>,
) -> IngestionResult<Vec<Document>> {
    let docs = with_connection(store, observer, |conn| conn.sample(database, collection, limit))?;
    let severity = if docs.is_empty() {
        IngestionSeverity::Warning
    } else {
        IngestionSeverity::Info
    };
    emit(
        observer,
        severity,
        &format!("connection ok; sampled {} documents from {database}.{collection}", docs.len()),
    );
    Ok(docs)
}

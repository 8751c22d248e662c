//! In-process [`DocumentStore`].
//!
//! Collections live in a shared map, so connections opened from clones of one [`MemoryStore`]
//! see the same data. The store tracks open connections, which lets callers verify that every
//! connection was released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{IngestionError, IngestionResult};

use super::document::Document;
use super::store::{DocumentStore, StoreConnection};

type Collections = HashMap<(String, String), Vec<Document>>;

#[derive(Debug, Default)]
struct Shared {
    collections: Mutex<Collections>,
    open_connections: AtomicUsize,
    total_connections: AtomicUsize,
    unavailable: Mutex<Option<String>>,
}

/// A thread-safe in-memory document store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of `database.collection`.
    pub fn with_collection(self, database: &str, collection: &str, documents: Vec<Document>) -> Self {
        if let Ok(mut map) = self.shared.collections.lock() {
            map.insert((database.to_string(), collection.to_string()), documents);
        }
        self
    }

    /// Make every subsequent `connect` fail with `SourceUnavailable`.
    pub fn set_unavailable(&self, reason: impl Into<String>) {
        if let Ok(mut u) = self.shared.unavailable.lock() {
            *u = Some(reason.into());
        }
    }

    /// Documents currently stored in `database.collection`.
    pub fn documents(&self, database: &str, collection: &str) -> Vec<Document> {
        self.shared
            .collections
            .lock()
            .ok()
            .and_then(|map| map.get(&(database.to_string(), collection.to_string())).cloned())
            .unwrap_or_default()
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.shared.open_connections.load(Ordering::SeqCst)
    }

    /// Connections opened over the store's lifetime.
    pub fn total_connections(&self) -> usize {
        self.shared.total_connections.load(Ordering::SeqCst)
    }
}

impl DocumentStore for MemoryStore {
    type Connection = MemoryConnection;

    fn connect(&self) -> IngestionResult<MemoryConnection> {
        let unavailable = self.shared.unavailable.lock().ok().and_then(|u| u.clone());
        if let Some(reason) = unavailable {
            return Err(IngestionError::source_unavailable(
                "cannot connect to in-memory store",
                reason,
            ));
        }
        self.shared.open_connections.fetch_add(1, Ordering::SeqCst);
        self.shared.total_connections.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            shared: Arc::clone(&self.shared),
            closed: false,
        })
    }

    fn describe(&self) -> String {
        "memory://".to_string()
    }
}

/// Connection handed out by [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryConnection {
    shared: Arc<Shared>,
    closed: bool,
}

impl MemoryConnection {
    fn collections(&self) -> IngestionResult<MutexGuard<'_, Collections>> {
        if self.closed {
            return Err(IngestionError::SourceUnavailable {
                message: "connection is closed".to_string(),
                source: None,
            });
        }
        self.shared.collections.lock().map_err(|_| IngestionError::SourceUnavailable {
            message: "in-memory store lock poisoned".to_string(),
            source: None,
        })
    }
}

impl StoreConnection for MemoryConnection {
    fn find_all(&mut self, database: &str, collection: &str) -> IngestionResult<Vec<Document>> {
        Ok(self
            .collections()?
            .get(&(database.to_string(), collection.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn insert_many(&mut self, database: &str, collection: &str, documents: Vec<Document>) -> IngestionResult<usize> {
        let n = documents.len();
        self.collections()?
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .extend(documents);
        Ok(n)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.shared.open_connections.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

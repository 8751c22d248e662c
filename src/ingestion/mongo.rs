//! MongoDB-backed [`DocumentStore`] (feature-gated behind `mongo`).
//!
//! Uses the synchronous driver. BSON documents are rendered as relaxed Extended JSON before
//! conversion, so ObjectIds and dates arrive as nested objects (`{"$oid": ...}`).

use mongodb::bson::{self, Bson, Document as BsonDocument, doc};
use mongodb::options::{ClientOptions, Tls, TlsOptions};
use mongodb::sync::Client;

use crate::config::StoreSettings;
use crate::error::{IngestionError, IngestionResult};

use super::document::Document;
use super::store::{DocumentStore, StoreConnection};

/// A MongoDB deployment reachable at [`StoreSettings::url`].
#[derive(Debug, Clone)]
pub struct MongoStore {
    settings: StoreSettings,
}

impl MongoStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self { settings }
    }

    fn client_options(&self) -> IngestionResult<ClientOptions> {
        let mut options = ClientOptions::parse(&self.settings.url).run().map_err(|e| {
            IngestionError::source_unavailable(
                format!("invalid connection string for {}", self.describe()),
                e,
            )
        })?;
        if let Some(ca) = &self.settings.tls_ca_file {
            options.tls = Some(Tls::Enabled(
                TlsOptions::builder().ca_file_path(ca.clone()).build(),
            ));
        }
        Ok(options)
    }
}

impl DocumentStore for MongoStore {
    type Connection = MongoConnection;

    fn connect(&self) -> IngestionResult<MongoConnection> {
        let client = Client::with_options(self.client_options()?).map_err(|e| {
            IngestionError::source_unavailable(format!("cannot connect to {}", self.describe()), e)
        })?;
        Ok(MongoConnection {
            client: Some(client),
        })
    }

    fn describe(&self) -> String {
        self.settings.redacted_url()
    }
}

/// An open MongoDB client.
#[derive(Debug)]
pub struct MongoConnection {
    client: Option<Client>,
}

impl MongoConnection {
    fn collection(&self, database: &str, collection: &str) -> IngestionResult<mongodb::sync::Collection<BsonDocument>> {
        let client = self.client.as_ref().ok_or_else(|| IngestionError::SourceUnavailable {
            message: "connection is closed".to_string(),
            source: None,
        })?;
        Ok(client.database(database).collection::<BsonDocument>(collection))
    }

    fn query(&self, database: &str, collection: &str, limit: Option<i64>) -> IngestionResult<Vec<Document>> {
        let coll = self.collection(database, collection)?;
        let mut find = coll.find(doc! {});
        if let Some(limit) = limit {
            find = find.limit(limit);
        }
        let cursor = find.run().map_err(|e| {
            IngestionError::source_unavailable(format!("query on {database}.{collection} failed"), e)
        })?;

        let mut out = Vec::new();
        for result in cursor {
            let document = result.map_err(|e| {
                IngestionError::source_unavailable(
                    format!("cannot read document from {database}.{collection}"),
                    e,
                )
            })?;
            out.push(bson_to_json(document));
        }
        Ok(out)
    }
}

impl StoreConnection for MongoConnection {
    fn find_all(&mut self, database: &str, collection: &str) -> IngestionResult<Vec<Document>> {
        self.query(database, collection, None)
    }

    fn sample(&mut self, database: &str, collection: &str, limit: usize) -> IngestionResult<Vec<Document>> {
        self.query(database, collection, Some(i64::try_from(limit).unwrap_or(i64::MAX)))
    }

    fn insert_many(&mut self, database: &str, collection: &str, documents: Vec<Document>) -> IngestionResult<usize> {
        if documents.is_empty() {
            return Ok(0);
        }
        let coll = self.collection(database, collection)?;
        let bson_docs = documents
            .iter()
            .map(bson::to_document)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IngestionError::source_unavailable("cannot encode documents as bson", e))?;
        let result = coll.insert_many(bson_docs).run().map_err(|e| {
            IngestionError::source_unavailable(format!("insert into {database}.{collection} failed"), e)
        })?;
        Ok(result.inserted_ids.len())
    }

    fn close(&mut self) {
        // Dropping the last handle shuts the client's connection pool down.
        self.client.take();
    }
}

fn bson_to_json(document: BsonDocument) -> Document {
    match Bson::Document(document).into_relaxed_extjson() {
        serde_json::Value::Object(map) => map,
        _ => Document::new(),
    }
}

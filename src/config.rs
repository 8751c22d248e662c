//! Ingestion configuration values.
//!
//! [`DataIngestionConfig`] is the immutable value consumed by the pipeline. It is normally derived
//! from a [`TrainingPipelineConfig`], which roots every artifact of one run under a timestamped
//! directory (`Artifacts/<MM_DD_YYYY_HH_MM_SS>/...`). [`StoreSettings`] carries the document-store
//! connection string, resolved from the environment rather than embedded in code.

use std::env;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{IngestionError, IngestionResult};

pub const PIPELINE_NAME: &str = "NetworkSecurity";
pub const ARTIFACT_DIR: &str = "Artifacts";
pub const TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";

pub const DATA_INGESTION_DATABASE_NAME: &str = "MISHALAI";
pub const DATA_INGESTION_COLLECTION_NAME: &str = "Network_Data";
pub const DATA_INGESTION_DIR_NAME: &str = "data_ingestion";
pub const DATA_INGESTION_FEATURE_STORE_DIR: &str = "feature_store";
pub const DATA_INGESTION_INGESTED_DIR: &str = "ingested";
pub const DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO: f64 = 0.2;

pub const FILE_NAME: &str = "phisingData.csv";
pub const TRAIN_FILE_NAME: &str = "train.csv";
pub const TEST_FILE_NAME: &str = "test.csv";

/// Environment variable holding the document-store connection string.
pub const MONGO_DB_URL_ENV: &str = "MONGO_DB_URL";
/// Optional environment variable pointing at a PEM bundle of trusted CA certificates.
pub const MONGO_TLS_CA_FILE_ENV: &str = "MONGO_TLS_CA_FILE";

/// Root configuration of one training-pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingPipelineConfig {
    pub pipeline_name: String,
    pub artifact_name: String,
    pub artifact_dir: PathBuf,
    pub timestamp: String,
}

impl TrainingPipelineConfig {
    /// Configuration rooted at `Artifacts/<now>`.
    pub fn new() -> Self {
        Self::at(Local::now())
    }

    /// Configuration rooted at `Artifacts/<timestamp>`.
    pub fn at(timestamp: DateTime<Local>) -> Self {
        Self::with_artifact_root(ARTIFACT_DIR, timestamp)
    }

    /// Configuration rooted at `<root>/<timestamp>`.
    pub fn with_artifact_root(root: impl AsRef<Path>, timestamp: DateTime<Local>) -> Self {
        let timestamp = timestamp.format(TIMESTAMP_FORMAT).to_string();
        Self {
            pipeline_name: PIPELINE_NAME.to_string(),
            artifact_name: ARTIFACT_DIR.to_string(),
            artifact_dir: root.as_ref().join(&timestamp),
            timestamp,
        }
    }
}

impl Default for TrainingPipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of the data-ingestion stage.
///
/// Fields are read through accessors; the `with_*` methods return modified copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataIngestionConfig {
    database_name: String,
    collection_name: String,
    feature_store_file_path: PathBuf,
    training_file_path: PathBuf,
    testing_file_path: PathBuf,
    train_test_split_ratio: f64,
}

impl DataIngestionConfig {
    pub fn new(
        database_name: impl Into<String>,
        collection_name: impl Into<String>,
        feature_store_file_path: impl Into<PathBuf>,
        training_file_path: impl Into<PathBuf>,
        testing_file_path: impl Into<PathBuf>,
        train_test_split_ratio: f64,
    ) -> Self {
        Self {
            database_name: database_name.into(),
            collection_name: collection_name.into(),
            feature_store_file_path: feature_store_file_path.into(),
            training_file_path: training_file_path.into(),
            testing_file_path: testing_file_path.into(),
            train_test_split_ratio,
        }
    }

    /// Derive the standard layout under the pipeline's artifact directory:
    ///
    /// ```text
    /// <artifact_dir>/data_ingestion/feature_store/phisingData.csv
    /// <artifact_dir>/data_ingestion/ingested/train.csv
    /// <artifact_dir>/data_ingestion/ingested/test.csv
    /// ```
    pub fn from_pipeline(pipeline: &TrainingPipelineConfig) -> Self {
        let ingestion_dir = pipeline.artifact_dir.join(DATA_INGESTION_DIR_NAME);
        let ingested_dir = ingestion_dir.join(DATA_INGESTION_INGESTED_DIR);
        Self::new(
            DATA_INGESTION_DATABASE_NAME,
            DATA_INGESTION_COLLECTION_NAME,
            ingestion_dir
                .join(DATA_INGESTION_FEATURE_STORE_DIR)
                .join(FILE_NAME),
            ingested_dir.join(TRAIN_FILE_NAME),
            ingested_dir.join(TEST_FILE_NAME),
            DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO,
        )
    }

    pub fn with_database(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = database_name.into();
        self
    }

    pub fn with_collection(mut self, collection_name: impl Into<String>) -> Self {
        self.collection_name = collection_name.into();
        self
    }

    pub fn with_split_ratio(mut self, ratio: f64) -> Self {
        self.train_test_split_ratio = ratio;
        self
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn feature_store_file_path(&self) -> &Path {
        &self.feature_store_file_path
    }

    pub fn training_file_path(&self) -> &Path {
        &self.training_file_path
    }

    pub fn testing_file_path(&self) -> &Path {
        &self.testing_file_path
    }

    /// Fraction of records routed to the test set.
    pub fn train_test_split_ratio(&self) -> f64 {
        self.train_test_split_ratio
    }

    /// `<database>.<collection>`, used as the source location in logs and errors.
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database_name, self.collection_name)
    }
}

/// Document-store connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub url: String,
    pub tls_ca_file: Option<PathBuf>,
}

impl StoreSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tls_ca_file: None,
        }
    }

    pub fn with_tls_ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tls_ca_file = Some(path.into());
        self
    }

    /// Resolve settings from `MONGO_DB_URL` and the optional `MONGO_TLS_CA_FILE`.
    pub fn from_env() -> IngestionResult<Self> {
        let url = env::var(MONGO_DB_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                IngestionError::invalid_configuration(format!(
                    "environment variable {MONGO_DB_URL_ENV} is not set"
                ))
            })?;
        let mut settings = Self::new(url);
        if let Some(ca) = env::var_os(MONGO_TLS_CA_FILE_ENV).filter(|v| !v.is_empty()) {
            settings = settings.with_tls_ca_file(ca);
        }
        Ok(settings)
    }

    /// The connection URL with any `user:password@` userinfo removed, safe for logs.
    pub fn redacted_url(&self) -> String {
        redact_url(&self.url)
    }
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("url", &self.redacted_url())
            .field("tls_ca_file", &self.tls_ca_file)
            .finish()
    }
}

fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://***@{}", &rest[at + 1..]),
        None => url.to_string(),
    }
}

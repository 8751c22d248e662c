//! Ingestion orchestrator: fetch → clean → snapshot → split → persist split.
//!
//! Stages run strictly in order; the first failure aborts the run and is returned as a
//! [`PipelineError`] annotated with the failing [`Stage`] and, where known, the location involved.
//! The feature-store snapshot written by the snapshot stage stays on disk when a later stage fails.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::artifact::{DataIngestionArtifact, write_csv};
use crate::config::DataIngestionConfig;
use crate::error::{IngestionError, IngestionResult, PipelineError, PipelineResult};
use crate::processing::{clean, is_clean, train_test_split};
use crate::types::DataSet;

use super::csv::convert_csv;
use super::observability::{IngestionObserver, IngestionSeverity, emit};
use super::store::{DocumentStore, fetch_from_store};

/// Ordered stages of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Clean,
    Snapshot,
    Split,
    PersistSplit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Fetch => "fetch",
            Stage::Clean => "clean",
            Stage::Snapshot => "snapshot",
            Stage::Split => "split",
            Stage::PersistSplit => "persist-split",
        };
        f.write_str(s)
    }
}

/// Where the raw records of a run come from.
pub trait RecordSource {
    /// Produce the raw record set. An empty source is an `EmptySource` error.
    fn fetch(
        &self,
        config: &DataIngestionConfig,
        observer: Option<&dyn IngestionObserver>,
    ) -> IngestionResult<DataSet>;

    /// Location reported in errors (a store namespace or a file path).
    fn location(&self, config: &DataIngestionConfig) -> String;
}

/// Records fetched from the configured collection of a [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct StoreSource<S> {
    store: S,
}

impl<S: DocumentStore> StoreSource<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: DocumentStore> RecordSource for StoreSource<S> {
    fn fetch(
        &self,
        config: &DataIngestionConfig,
        observer: Option<&dyn IngestionObserver>,
    ) -> IngestionResult<DataSet> {
        fetch_from_store(&self.store, config, observer)
    }

    fn location(&self, config: &DataIngestionConfig) -> String {
        format!("{}/{}", self.store.describe(), config.namespace())
    }
}

/// Records read from a CSV file, used for seeding runs.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvSource {
    fn fetch(
        &self,
        _config: &DataIngestionConfig,
        observer: Option<&dyn IngestionObserver>,
    ) -> IngestionResult<DataSet> {
        let dataset = convert_csv(&self.path)?;
        emit(
            observer,
            IngestionSeverity::Info,
            &format!("read {} records from csv '{}'", dataset.row_count(), self.path.display()),
        );
        if dataset.is_empty() {
            return Err(IngestionError::empty_source(format!(
                "csv file '{}' has no records",
                self.path.display()
            )));
        }
        Ok(dataset)
    }

    fn location(&self, _config: &DataIngestionConfig) -> String {
        self.path.display().to_string()
    }
}

/// The data-ingestion stage of the training pipeline.
pub struct DataIngestion<R> {
    config: DataIngestionConfig,
    source: R,
    observer: Option<Arc<dyn IngestionObserver>>,
}

impl<R> fmt::Debug for DataIngestion<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataIngestion")
            .field("config", &self.config)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl<R: RecordSource> DataIngestion<R> {
    pub fn new(config: DataIngestionConfig, source: R) -> Self {
        Self {
            config,
            source,
            observer: None,
        }
    }

    /// Attach an observer for stage events.
    pub fn with_observer(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    /// Run every stage and return the artifact referencing the train/test files.
    ///
    /// On failure the error is reported to the observer (at `Critical` for source/write
    /// failures, `Error` otherwise) and returned; nothing is retried.
    pub fn initiate_data_ingestion(&self) -> PipelineResult<DataIngestionArtifact> {
        self.emit(IngestionSeverity::Info, "starting data ingestion");
        let result = self.run_stages();
        match &result {
            Ok(artifact) => self.emit(
                IngestionSeverity::Info,
                &format!(
                    "data ingestion completed: train={} test={}",
                    artifact.trained_file_path().display(),
                    artifact.test_file_path().display()
                ),
            ),
            Err(e) => self.emit(IngestionSeverity::for_error(e.cause()), &e.to_string()),
        }
        result
    }

    fn run_stages(&self) -> PipelineResult<DataIngestionArtifact> {
        let config = &self.config;

        self.enter(Stage::Fetch);
        let raw = self
            .source
            .fetch(config, self.observer())
            .map_err(|e| e.at_stage(Stage::Fetch, Some(self.source.location(config))))?;

        self.enter(Stage::Clean);
        let dataset = if is_clean(&raw) { raw } else { clean(raw) };
        if dataset.column_count() == 0 {
            return Err(IngestionError::empty_source("records have no fields left after cleaning")
                .at_stage(Stage::Clean, Some(self.source.location(config))));
        }
        self.emit(
            IngestionSeverity::Info,
            &format!(
                "clean dataset has {} rows and {} columns",
                dataset.row_count(),
                dataset.column_count()
            ),
        );

        self.enter(Stage::Snapshot);
        let feature_store = config.feature_store_file_path();
        write_csv(&dataset, feature_store).map_err(|e| at_path(e, Stage::Snapshot, feature_store))?;
        self.emit(
            IngestionSeverity::Info,
            &format!(
                "feature store saved at {} with {} rows",
                feature_store.display(),
                dataset.row_count()
            ),
        );

        self.enter(Stage::Split);
        let ratio = config.train_test_split_ratio();
        let split = train_test_split(&dataset, ratio).map_err(|e| e.at_stage(Stage::Split, None))?;
        drop(dataset);
        self.emit(
            IngestionSeverity::Info,
            &format!(
                "split with test ratio {ratio}: train={} rows, test={} rows",
                split.train.row_count(),
                split.test.row_count()
            ),
        );

        self.enter(Stage::PersistSplit);
        for (subset, path) in [
            (&split.train, config.training_file_path()),
            (&split.test, config.testing_file_path()),
        ] {
            write_csv(subset, path).map_err(|e| at_path(e, Stage::PersistSplit, path))?;
            self.emit(
                IngestionSeverity::Info,
                &format!("saved {} rows to {}", subset.row_count(), path.display()),
            );
        }

        Ok(DataIngestionArtifact::new(
            config.training_file_path(),
            config.testing_file_path(),
        ))
    }

    fn observer(&self) -> Option<&dyn IngestionObserver> {
        self.observer.as_deref()
    }

    fn emit(&self, severity: IngestionSeverity, message: &str) {
        emit(self.observer(), severity, message);
    }

    fn enter(&self, stage: Stage) {
        self.emit(IngestionSeverity::Info, &format!("entering {stage} stage"));
    }
}

fn at_path(e: IngestionError, stage: Stage, path: &Path) -> PipelineError {
    e.at_stage(stage, Some(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Fetch.to_string(), "fetch");
        assert_eq!(Stage::PersistSplit.to_string(), "persist-split");
    }

    #[test]
    fn csv_source_reports_missing_file_as_source_unavailable() {
        let cfg = DataIngestionConfig::new("db", "c", "f.csv", "tr.csv", "te.csv", 0.2);
        let src = CsvSource::new("definitely/missing/file.csv");
        let err = src.fetch(&cfg, None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::SourceUnavailable);
        assert_eq!(src.location(&cfg), "definitely/missing/file.csv");
    }
}

//! Artifact writer and the ingestion artifact handed to downstream stages.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{IngestionError, IngestionResult};
use crate::types::DataSet;

/// File paths of the train and test sets produced by a successful ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataIngestionArtifact {
    trained_file_path: PathBuf,
    test_file_path: PathBuf,
}

impl DataIngestionArtifact {
    pub fn new(trained_file_path: impl Into<PathBuf>, test_file_path: impl Into<PathBuf>) -> Self {
        Self {
            trained_file_path: trained_file_path.into(),
            test_file_path: test_file_path.into(),
        }
    }

    pub fn trained_file_path(&self) -> &Path {
        &self.trained_file_path
    }

    pub fn test_file_path(&self) -> &Path {
        &self.test_file_path
    }
}

/// Write `dataset` as CSV to `path`, creating missing parent directories.
///
/// The header lists the schema's field names in order, followed by one line per row in row
/// order. Null cells are written empty; fields are quoted only when necessary. An existing file is
/// truncated and fully replaced.
pub fn write_csv(dataset: &DataSet, path: impl AsRef<Path>) -> IngestionResult<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| {
            IngestionError::write_failure(path, format!("cannot create directory '{}'", dir.display()), e)
        })?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| IngestionError::write_failure(path, "cannot open file for writing", e))?;

    wtr.write_record(dataset.schema.field_names())
        .map_err(|e| IngestionError::write_failure(path, "cannot write header", e))?;

    let mut cells: Vec<String> = Vec::with_capacity(dataset.column_count());
    for (row_idx0, row) in dataset.rows.iter().enumerate() {
        cells.clear();
        cells.extend(row.iter().map(ToString::to_string));
        wtr.write_record(&cells).map_err(|e| {
            IngestionError::write_failure(path, format!("cannot write row {}", row_idx0 + 1), e)
        })?;
    }

    wtr.flush()
        .map_err(|e| IngestionError::write_failure(path, "cannot flush file", e))
}

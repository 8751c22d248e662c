use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ingestion::pipeline::Stage;

/// Boxed underlying cause (I/O, CSV, driver errors).
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Convenience result type for source, writer and split operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for a full pipeline run.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// The four error kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Fetch, connect or parse failure at the source adapter.
    SourceUnavailable,
    /// The source yielded zero usable records.
    EmptySource,
    /// Persistence failure at the artifact writer.
    WriteFailure,
    /// Split ratio or record-count precondition violated, or a required setting is missing.
    InvalidConfiguration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SourceUnavailable => "source unavailable",
            Self::EmptySource => "empty source",
            Self::WriteFailure => "write failure",
            Self::InvalidConfiguration => "invalid configuration",
        };
        f.write_str(s)
    }
}

/// Error type returned by the source adapters, the artifact writer and the split.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The source could not be reached, read or parsed.
    #[error("source unavailable: {message}")]
    SourceUnavailable {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The source yielded zero records.
    #[error("empty source: {message}")]
    EmptySource { message: String },

    /// A file could not be written (directory creation, open, serialization, flush).
    #[error("write failure at '{}': {message}", .path.display())]
    WriteFailure {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A configuration value or record-count precondition is violated.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl IngestionError {
    pub fn source_unavailable(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn empty_source(message: impl Into<String>) -> Self {
        Self::EmptySource {
            message: message.into(),
        }
    }

    pub fn write_failure(
        path: impl AsRef<Path>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::WriteFailure {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            Self::EmptySource { .. } => ErrorKind::EmptySource,
            Self::WriteFailure { .. } => ErrorKind::WriteFailure,
            Self::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
        }
    }

    /// Attach the originating pipeline stage and, when known, the source location.
    pub fn at_stage(self, stage: Stage, location: Option<String>) -> PipelineError {
        PipelineError {
            stage,
            location,
            source: self,
        }
    }
}

/// A stage-annotated failure of a full ingestion run.
///
/// Carries the error kind (via [`PipelineError::kind`]), the stage that failed, the location
/// involved (a store namespace or a file path) and the underlying [`IngestionError`].
#[derive(Debug, Error)]
#[error("data ingestion failed at {stage} stage{}: {source}", location_suffix(.location))]
pub struct PipelineError {
    stage: Stage,
    location: Option<String>,
    source: IngestionError,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The wrapped stage-level error.
    pub fn cause(&self) -> &IngestionError {
        &self.source
    }
}

fn location_suffix(location: &Option<String>) -> String {
    location
        .as_deref()
        .map(|l| format!(" [{l}]"))
        .unwrap_or_default()
}

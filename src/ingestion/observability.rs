//! Write-only event sinks for ingestion runs.
//!
//! The pipeline never resolves a global logger; callers inject an [`IngestionObserver`] and the
//! pipeline emits one event per stage transition and record-count milestone.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

use crate::config::TIMESTAMP_FORMAT;
use crate::error::{ErrorKind, IngestionError};

/// Severity classification of an emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (I/O or connectivity failures).
    Critical,
}

impl IngestionSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Severity used when reporting a failed operation.
    pub fn for_error(e: &IngestionError) -> Self {
        match e.kind() {
            ErrorKind::SourceUnavailable | ErrorKind::WriteFailure => Self::Critical,
            ErrorKind::EmptySource | ErrorKind::InvalidConfiguration => Self::Error,
        }
    }
}

impl fmt::Display for IngestionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer interface for ingestion events.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called for every event the pipeline emits.
    fn emit(&self, severity: IngestionSeverity, message: &str);
}

/// Emit through an optional observer.
pub(crate) fn emit(observer: Option<&dyn IngestionObserver>, severity: IngestionSeverity, message: &str) {
    if let Some(obs) = observer {
        obs.emit(severity, message);
    }
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn emit(&self, severity: IngestionSeverity, message: &str) {
        for o in &self.observers {
            o.emit(severity, message);
        }
    }
}

/// Logs events to stderr, one line per event in the [`FileObserver`] format.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn emit(&self, severity: IngestionSeverity, message: &str) {
        eprintln!("{}", log_line(severity, message));
    }
}

fn log_line(severity: IngestionSeverity, message: &str) -> String {
    format!(
        "[ {} ] network_ingest - {} - {}",
        Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
        severity,
        message
    )
}

/// Forwards events to the `tracing` subscriber installed by the process.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn emit(&self, severity: IngestionSeverity, message: &str) {
        match severity {
            IngestionSeverity::Info => tracing::info!(target: "network_ingest", "{message}"),
            IngestionSeverity::Warning => tracing::warn!(target: "network_ingest", "{message}"),
            IngestionSeverity::Error | IngestionSeverity::Critical => {
                tracing::error!(target: "network_ingest", severity = %severity, "{message}")
            }
        }
    }
}

/// Appends events to a local log file.
///
/// Lines look like `[ 2025-03-07 09:05:01,123 ] network_ingest - INFO - message`.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Create `dir` if needed and log to `<dir>/<MM_DD_YYYY_HH_MM_SS>.log`.
    pub fn timestamped(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let name = format!("{}.log", Local::now().format(TIMESTAMP_FORMAT));
        Ok(Self::new(dir.join(name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn emit(&self, severity: IngestionSeverity, message: &str) {
        self.append_line(&log_line(severity, message));
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<(IngestionSeverity, String)>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<(IngestionSeverity, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Messages recorded at exactly `severity`.
    pub fn messages_at(&self, severity: IngestionSeverity) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m)
            .collect()
    }
}

impl IngestionObserver for MemoryObserver {
    fn emit(&self, severity: IngestionSeverity, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((severity, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_fans_out_to_every_observer() {
        let a = Arc::new(MemoryObserver::new());
        let b = Arc::new(MemoryObserver::new());
        let composite = CompositeObserver::new(vec![a.clone(), b.clone()]);

        composite.emit(IngestionSeverity::Info, "hello");
        composite.emit(IngestionSeverity::Error, "boom");

        assert_eq!(a.events().len(), 2);
        assert_eq!(b.messages_at(IngestionSeverity::Error), vec!["boom".to_string()]);
    }

    #[test]
    fn severity_for_error_kinds() {
        assert_eq!(
            IngestionSeverity::for_error(&IngestionError::empty_source("x")),
            IngestionSeverity::Error
        );
        let io = std::io::Error::other("disk full");
        assert_eq!(
            IngestionSeverity::for_error(&IngestionError::write_failure("a.csv", "write", io)),
            IngestionSeverity::Critical
        );
        assert!(IngestionSeverity::Critical > IngestionSeverity::Warning);
    }

    #[test]
    fn log_line_carries_timestamp_level_and_message() {
        let line = log_line(IngestionSeverity::Critical, "disk full");
        assert!(line.starts_with("[ "));
        assert!(line.ends_with(" ] network_ingest - CRITICAL - disk full"));
    }

    #[test]
    fn file_observer_appends_formatted_lines() {
        let dir = std::env::temp_dir().join(format!(
            "network-ingest-logs-{}",
            std::process::id()
        ));
        let obs = FileObserver::timestamped(&dir).unwrap();
        obs.emit(IngestionSeverity::Info, "first");
        obs.emit(IngestionSeverity::Warning, "second");

        let text = fs::read_to_string(obs.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[ "));
        assert!(lines[0].ends_with("network_ingest - INFO - first"));
        assert!(lines[1].ends_with("WARNING - second"));
        assert!(obs.path().extension().is_some_and(|e| e == "log"));

        let _ = fs::remove_dir_all(&dir);
    }
}

//! Failure-detail sinks
//!
//! Failure detail can carry remote response bodies, so it is kept off the
//! console and written here instead.

use crate::error::{Error, Result, ResultExt};
use crate::types::OperationOutcome;
use chrono::{SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Destination for failed-item detail
pub trait FailureSink: Send + Sync {
    /// Record one failed outcome
    fn record(&self, outcome: &OperationOutcome) -> Result<()>;
}

/// Append-only failure log file, one timestamped line per failed item
pub struct FailureLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FailureLog {
    /// Open (or create) the log for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Cannot open failure log {}", path.display()))?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Log file location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FailureSink for FailureLog {
    fn record(&self, outcome: &OperationOutcome) -> Result<()> {
        let line = format_line(outcome);
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| Error::Other("failure log lock poisoned".to_string()))?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for FailureLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// In-memory sink, handy for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryFailureSink {
    entries: Mutex<Vec<OperationOutcome>>,
}

impl MemoryFailureSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded failures
    pub fn entries(&self) -> Vec<OperationOutcome> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Number of recorded failures
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FailureSink for MemoryFailureSink {
    fn record(&self, outcome: &OperationOutcome) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| Error::Other("failure sink lock poisoned".to_string()))?
            .push(outcome.clone());
        Ok(())
    }
}

fn format_line(outcome: &OperationOutcome) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let detail = outcome.error_detail.as_deref().unwrap_or("no detail");
    // Keep one entry per line even when the body is multi-line
    let detail = detail.replace(['\r', '\n'], " ");
    format!("{timestamp} {} {detail}", outcome.item_identifier)
}

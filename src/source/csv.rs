//! Tabular file source
//!
//! Reads a UTF-8 (BOM tolerant), comma-delimited file whose first row names
//! the attribute paths. The whole file is parsed and checked when the source
//! is opened, so a malformed row fails the run before any item is dispatched.
//! Rows are then handed out in chunks of up to 100 non-blank rows; the first
//! short chunk ends the stream.

use super::types::{Record, RecordSource, WorkBatch};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use tracing::debug;

/// Rows per batch for file input
pub const CSV_BATCH_SIZE: usize = 100;

/// UTF-8 BOM bytes
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Source over a CSV file
pub struct CsvSource {
    headers: Vec<String>,
    pending: VecDeque<Record>,
    batch_size: usize,
    total_rows: u64,
    rows_read: u64,
    done: bool,
}

impl CsvSource {
    /// Open a file, read its header row and check every data row
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let (headers, pending) = parse_document(&data)?;
        debug!(
            "Read {} rows with {} columns from {}",
            pending.len(),
            headers.len(),
            path.display()
        );

        Ok(Self {
            headers,
            total_rows: pending.len() as u64,
            pending,
            batch_size: CSV_BATCH_SIZE,
            rows_read: 0,
            done: false,
        })
    }

    /// Override the chunk size
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Header row (trimmed, BOM removed)
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Non-blank data rows in the file
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Non-blank data rows handed out so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    type Item = Record;

    async fn next_batch(&mut self, _token: &str) -> Result<WorkBatch<Record>> {
        if self.done {
            return Ok(WorkBatch::last(Vec::new()));
        }

        let take = self.batch_size.min(self.pending.len());
        let records: Vec<Record> = self.pending.drain(..take).collect();
        self.rows_read += records.len() as u64;

        if records.len() < self.batch_size {
            self.done = true;
            Ok(WorkBatch::last(records))
        } else {
            Ok(WorkBatch::more(records, self.rows_read.to_string()))
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

impl std::fmt::Debug for CsvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvSource")
            .field("headers", &self.headers)
            .field("total_rows", &self.total_rows)
            .field("rows_read", &self.rows_read)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// Parse a whole CSV document into trimmed headers and non-blank records
fn parse_document(data: &[u8]) -> Result<(Vec<String>, VecDeque<Record>)> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::csv(1, "file is empty, expected a header row"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(&e, 1))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(Error::csv(1, "header row is blank"));
    }

    let mut records = VecDeque::new();
    for result in reader.records() {
        let row = result.map_err(|e| csv_error(&e, 0))?;
        let line = row.position().map_or(0, |p| p.line() as usize);

        if row.iter().all(str::is_empty) {
            debug!("Skipping blank row at line {}", line);
            continue;
        }

        records.push_back(Record::from_pairs(line, headers.iter().cloned().zip(row.iter())));
    }

    Ok((headers, records))
}

/// Map a reader error onto a line-numbered data error
fn csv_error(error: &csv::Error, fallback_line: usize) -> Error {
    let line = error
        .position()
        .map_or(fallback_line, |p| p.line() as usize);

    match error.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => Error::csv(line, format!("expected {expected_len} fields, found {len}")),
        csv::ErrorKind::Utf8 { err, .. } => Error::csv(line, format!("invalid UTF-8: {err}")),
        _ => Error::csv(line, error.to_string()),
    }
}

//! Record source types and traits
//!
//! Defines the batch contract shared by the paginated and tabular sources.

use crate::error::Result;
use async_trait::async_trait;

/// One flat input row: attribute path → trimmed raw value
///
/// Fields keep header order. Duplicate paths are kept as-is; lookups and the
/// attribute mapper both resolve them last-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
    line: usize,
}

impl Record {
    /// Create an empty record for an input line
    pub fn new(line: usize) -> Self {
        Self {
            fields: Vec::new(),
            line,
        }
    }

    /// Build a record from path/value pairs (values are trimmed)
    pub fn from_pairs<K, V>(line: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut record = Self::new(line);
        for (key, value) in pairs {
            record.push(key, value.as_ref());
        }
        record
    }

    /// Append a field
    pub fn push(&mut self, path: impl Into<String>, value: &str) {
        self.fields.push((path.into(), value.trim().to_string()));
    }

    /// Value for a path (last occurrence wins)
    pub fn get(&self, path: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(key, _)| key == path)
            .map(|(_, value)| value.as_str())
    }

    /// Check whether the input carried this column at all
    pub fn has_column(&self, path: &str) -> bool {
        self.fields.iter().any(|(key, _)| key == path)
    }

    /// Iterate fields in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Input line this record came from (1-based, header is line 1)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A bounded batch of work items
#[derive(Debug, Clone)]
pub struct WorkBatch<T> {
    /// Items in source order
    pub items: Vec<T>,
    /// Opaque cursor for the next batch; `None` means no more data
    pub continuation: Option<String>,
}

impl<T> WorkBatch<T> {
    /// Create a final batch
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            continuation: None,
        }
    }

    /// Create a batch with more data behind it
    pub fn more(items: Vec<T>, continuation: impl Into<String>) -> Self {
        Self {
            items,
            continuation: Some(continuation.into()),
        }
    }

    /// Check if this is the final batch
    pub fn is_done(&self) -> bool {
        self.continuation.is_none()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the batch has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Forward-only producer of work batches
///
/// A source that fails mid-stream cannot be resumed; the run restarts from
/// the beginning.
#[async_trait]
pub trait RecordSource: Send {
    /// Item type handed to the operation
    type Item: Send + Sync + 'static;

    /// Produce the next batch
    ///
    /// `token` is the current bearer token, for sources that read from the
    /// remote API. Calling again after a final batch yields an empty final
    /// batch without further I/O.
    async fn next_batch(&mut self, token: &str) -> Result<WorkBatch<Self::Item>>;

    /// Upfront item count for progress reporting, if the source knows one
    async fn record_count(&mut self, _token: &str) -> Result<Option<u64>> {
        Ok(None)
    }

    /// Check if the final batch has been produced
    fn is_done(&self) -> bool;
}

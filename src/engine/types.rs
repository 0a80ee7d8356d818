//! Engine types
//!
//! Progress and summary records emitted by the run loop.

use crate::report::RunCounters;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Emitted after every resolved batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// 1-based batch number
    pub batch_number: usize,
    /// Items in the batch as produced by the source
    pub batch_size: usize,
    /// Items in the batch that did not qualify
    pub skipped: usize,
    /// Whether the credential was refreshed before this batch
    pub token_refreshed: bool,
    /// Cumulative totals after the batch
    pub counters: RunCounters,
}

/// Final totals and timing of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Cumulative totals
    pub counters: RunCounters,
    /// Batches processed
    pub batches: usize,
    /// Credential refreshes during the run
    pub token_refreshes: usize,
    /// Failures whose detail could not be written to the failure sink
    pub sink_errors: u64,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Wall-clock end
    pub finished_at: DateTime<Utc>,
    /// Elapsed time in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Check if every dispatched item succeeded
    pub fn is_clean(&self) -> bool {
        self.counters.failed == 0 && self.sink_errors == 0
    }
}

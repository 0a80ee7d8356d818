//! Report types
//!
//! Cumulative counters for a run.

use crate::types::OperationOutcome;
use serde::Serialize;
use std::fmt;

/// Cumulative item counters
///
/// Only ever incremented; `processed == succeeded + failed + skipped` holds
/// after every [`RunCounters::record`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    /// Items that produced an outcome
    pub processed: u64,
    /// Remote operation succeeded
    pub succeeded: u64,
    /// Remote operation failed
    pub failed: u64,
    /// Item did not qualify
    pub skipped: u64,
}

impl RunCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome
    pub fn record(&mut self, outcome: &OperationOutcome) {
        if outcome.skipped {
            self.skipped += 1;
        } else if outcome.succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.processed += 1;
    }

    /// Check the processed/partition invariant
    pub fn is_consistent(&self) -> bool {
        self.processed == self.succeeded + self.failed + self.skipped
    }
}

impl fmt::Display for RunCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed: {} | succeeded: {} | failed: {} | skipped: {}",
            self.processed, self.succeeded, self.failed, self.skipped
        )
    }
}

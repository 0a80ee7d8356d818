//! Result aggregation
//!
//! # Overview
//!
//! The report module provides:
//! - `RunCounters` - Cumulative processed/succeeded/failed/skipped counts
//! - `FailureSink` - Destination for failure detail (`FailureLog` on disk,
//!   `MemoryFailureSink` in memory)
//! - `ResultAggregator` - Folds batch outcomes into the counters and routes
//!   failures to the sink

mod sink;
mod types;

pub use sink::{FailureLog, FailureSink, MemoryFailureSink};
pub use types::RunCounters;

use crate::types::OperationOutcome;
use std::sync::Arc;
use tracing::{debug, warn};

/// Folds per-item outcomes into run totals
pub struct ResultAggregator {
    counters: RunCounters,
    sink: Arc<dyn FailureSink>,
    sink_errors: u64,
}

impl ResultAggregator {
    /// Create an aggregator writing failures to `sink`
    pub fn new(sink: Arc<dyn FailureSink>) -> Self {
        Self {
            counters: RunCounters::new(),
            sink,
            sink_errors: 0,
        }
    }

    /// Fold a resolved batch
    ///
    /// A sink write failure is logged and counted; it does not stop the run.
    pub fn fold(&mut self, outcomes: &[OperationOutcome]) {
        for outcome in outcomes {
            self.counters.record(outcome);
            if !outcome.is_failure() {
                continue;
            }
            debug!("Item {} failed", outcome.item_identifier);
            if let Err(e) = self.sink.record(outcome) {
                self.sink_errors += 1;
                warn!(
                    "Could not write failure detail for {}: {}",
                    outcome.item_identifier, e
                );
            }
        }
    }

    /// Current totals
    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// Failures that could not be written to the sink
    pub fn sink_errors(&self) -> u64 {
        self.sink_errors
    }
}

impl std::fmt::Debug for ResultAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultAggregator")
            .field("counters", &self.counters)
            .field("sink_errors", &self.sink_errors)
            .finish_non_exhaustive()
    }
}

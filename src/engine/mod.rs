//! Run orchestration
//!
//! Drives one bulk run from start to finish.
//!
//! # Overview
//!
//! The engine module provides:
//! - `BulkEngine` - Owns the credential, the executor and the aggregator for
//!   the duration of a run
//! - `BatchReport` - Progress record emitted after every batch
//! - `RunSummary` - Final totals and timing
//!
//! Each iteration refreshes a stale credential, pulls the next batch from the
//! source, narrows it with the filter, dispatches the qualifying items and
//! folds the outcomes. Batches are not pipelined: batch N is fully resolved
//! before batch N+1 is requested.

mod types;

pub use types::{BatchReport, RunSummary};

use crate::auth::CredentialBroker;
use crate::error::Result;
use crate::executor::{BulkExecutor, ItemOperation};
use crate::filter::ItemFilter;
use crate::report::{ResultAggregator, RunCounters};
use crate::source::RecordSource;
use crate::types::{now_ms, OperationOutcome};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Bulk run context
pub struct BulkEngine {
    /// Credential, written only between batches
    broker: CredentialBroker,
    /// Worker pool with the shared rate limiter
    executor: BulkExecutor,
    /// Cumulative outcome totals
    aggregator: ResultAggregator,
}

impl BulkEngine {
    /// Create an engine
    pub fn new(
        broker: CredentialBroker,
        executor: BulkExecutor,
        aggregator: ResultAggregator,
    ) -> Self {
        Self {
            broker,
            executor,
            aggregator,
        }
    }

    /// Get the credential broker
    pub fn broker(&self) -> &CredentialBroker {
        &self.broker
    }

    /// Get mutable credential broker
    pub fn broker_mut(&mut self) -> &mut CredentialBroker {
        &mut self.broker
    }

    /// Current totals
    pub fn counters(&self) -> RunCounters {
        self.aggregator.counters()
    }

    /// Run `operation` over every qualifying item of `source`
    ///
    /// `on_batch` is called after each batch with the cumulative totals. Any
    /// error from the source, the credential refresh or a connectivity
    /// escalation ends the run; already-applied remote changes stay applied.
    /// A batch cut short by escalation is still folded and reported first.
    pub async fn run<S, O, F>(
        &mut self,
        source: &mut S,
        operation: Arc<O>,
        filter: &F,
        on_batch: impl FnMut(&BatchReport),
    ) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        O: ItemOperation<S::Item> + ?Sized,
        F: ItemFilter<S::Item> + ?Sized,
    {
        let result = self.run_batches(source, operation, filter, on_batch).await;
        if let Err(e) = &result {
            if e.is_fatal() {
                error!("Run aborted: {}", e);
            } else {
                warn!("Run stopped: {}", e);
            }
        }
        result
    }

    async fn run_batches<S, O, F>(
        &mut self,
        source: &mut S,
        operation: Arc<O>,
        filter: &F,
        mut on_batch: impl FnMut(&BatchReport),
    ) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        O: ItemOperation<S::Item> + ?Sized,
        F: ItemFilter<S::Item> + ?Sized,
    {
        let start = Instant::now();
        let started_at = Utc::now();
        let mut batches = 0;
        let mut token_refreshes = 0;

        loop {
            let mut refreshed = self.broker.refresh_if_stale(now_ms()).await?;
            let batch = source.next_batch(self.broker.token()).await?;
            let done = batch.is_done();
            batches += 1;

            // Listing may have taken a while
            refreshed |= self.broker.refresh_if_stale(now_ms()).await?;
            if refreshed {
                token_refreshes += 1;
            }

            let batch_size = batch.len();
            let (qualifying, skipped): (Vec<_>, Vec<_>) =
                batch.items.into_iter().partition(|item| filter.qualifies(item));
            let skipped: Vec<OperationOutcome> = skipped
                .iter()
                .map(|item| OperationOutcome::skipped(operation.identify(item)))
                .collect();
            debug!(
                "Batch {}: {} items, {} qualifying",
                batches,
                batch_size,
                qualifying.len()
            );

            let token: Arc<str> = Arc::from(self.broker.token());
            let dispatch = self
                .executor
                .dispatch(qualifying, operation.clone(), token)
                .await;
            let mut outcomes = dispatch.outcomes;
            let skipped_count = skipped.len();
            outcomes.extend(skipped);
            self.aggregator.fold(&outcomes);

            on_batch(&BatchReport {
                batch_number: batches,
                batch_size,
                skipped: skipped_count,
                token_refreshed: refreshed,
                counters: self.aggregator.counters(),
            });

            if let Some(e) = dispatch.aborted {
                return Err(e);
            }
            if done {
                break;
            }
        }

        let counters = self.aggregator.counters();
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Run finished in {}ms: {}", duration_ms, counters);

        Ok(RunSummary {
            counters,
            batches,
            token_refreshes,
            sink_errors: self.aggregator.sink_errors(),
            started_at,
            finished_at: Utc::now(),
            duration_ms,
        })
    }
}

impl std::fmt::Debug for BulkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkEngine")
            .field("broker", &self.broker)
            .field("executor", &self.executor)
            .field("aggregator", &self.aggregator)
            .finish()
    }
}

//! Bounded-concurrency dispatch
//!
//! # Overview
//!
//! `BulkExecutor::execute` spreads one batch over a fixed set of workers that
//! pull items from a shared queue. Every call first takes a permit from the
//! shared [`RateLimiter`], so the rate ceiling holds across workers and across
//! batches. `execute` returns only after every worker has drained.
//!
//! A failing or panicking item becomes a failure outcome and never affects
//! its siblings. The one exception is a run of consecutive connectivity
//! failures: once it reaches the configured threshold, workers stop taking
//! items. [`BulkExecutor::dispatch`] then marks every item still queued as a
//! failure and reports [`Error::Connectivity`] alongside the outcomes.

mod types;

pub use types::{Dispatch, ExecutorConfig, ItemOperation};

use crate::error::{Error, Result};
use crate::http::RateLimiter;
use crate::types::OperationOutcome;
use futures::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Worker pool for one operation per item
#[derive(Debug, Clone)]
pub struct BulkExecutor {
    limiter: RateLimiter,
    config: ExecutorConfig,
    connectivity_streak: Arc<AtomicUsize>,
}

/// State shared by the workers of one batch
struct Shared<T, O: ?Sized> {
    queue: Mutex<VecDeque<T>>,
    operation: Arc<O>,
    token: Arc<str>,
    limiter: RateLimiter,
    streak: Arc<AtomicUsize>,
    threshold: usize,
    abort: AtomicBool,
}

impl BulkExecutor {
    /// Create an executor around a shared limiter
    pub fn new(limiter: RateLimiter, config: ExecutorConfig) -> Self {
        Self {
            limiter,
            config,
            connectivity_streak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Pool settings
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Current run of consecutive connectivity failures
    pub fn connectivity_streak(&self) -> usize {
        self.connectivity_streak.load(Ordering::SeqCst)
    }

    /// Apply `operation` to every item and wait for all of them
    ///
    /// Outcomes come back in completion order. A connectivity escalation
    /// discards them and returns the error; use [`Self::dispatch`] to keep
    /// them.
    pub async fn execute<T, O>(
        &self,
        items: Vec<T>,
        operation: Arc<O>,
        token: Arc<str>,
    ) -> Result<Vec<OperationOutcome>>
    where
        T: Send + Sync + 'static,
        O: ItemOperation<T> + ?Sized,
    {
        self.dispatch(items, operation, token).await.into_result()
    }

    /// Apply `operation` to every item, keeping outcomes on escalation
    ///
    /// Every item gets exactly one outcome. Items still queued when the
    /// connectivity threshold is reached become "not attempted" failures.
    pub async fn dispatch<T, O>(&self, items: Vec<T>, operation: Arc<O>, token: Arc<str>) -> Dispatch
    where
        T: Send + Sync + 'static,
        O: ItemOperation<T> + ?Sized,
    {
        if items.is_empty() {
            return Dispatch {
                outcomes: Vec::new(),
                aborted: None,
            };
        }

        let total = items.len();
        let workers = self.config.max_concurrency.min(total).max(1);
        debug!("Dispatching {} items over {} workers", total, workers);

        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::from(items)),
            operation,
            token,
            limiter: self.limiter.clone(),
            streak: self.connectivity_streak.clone(),
            threshold: self.config.connectivity_failure_threshold,
            abort: AtomicBool::new(false),
        });

        let mut join_set: JoinSet<Vec<OperationOutcome>> = JoinSet::new();
        for _ in 0..workers {
            let shared = shared.clone();
            join_set.spawn(async move { run_worker(shared).await });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(worker_outcomes) => outcomes.extend(worker_outcomes),
                Err(e) => error!("Worker task ended abnormally: {}", e),
            }
        }

        if !shared.abort.load(Ordering::SeqCst) {
            return Dispatch {
                outcomes,
                aborted: None,
            };
        }

        let remaining: Vec<T> = shared.queue.lock().await.drain(..).collect();
        for item in &remaining {
            let id = identify(&*shared.operation, item);
            outcomes.push(OperationOutcome::failure(
                id,
                "not attempted: run stopped after repeated connectivity failures",
            ));
        }

        let streak = shared.streak.load(Ordering::SeqCst);
        warn!(
            "Batch stopped early, {} items not attempted",
            remaining.len()
        );
        Dispatch {
            outcomes,
            aborted: Some(Error::connectivity(format!(
                "{streak} consecutive item calls could not reach the remote host"
            ))),
        }
    }
}

async fn run_worker<T, O>(shared: Arc<Shared<T, O>>) -> Vec<OperationOutcome>
where
    T: Send + Sync + 'static,
    O: ItemOperation<T> + ?Sized,
{
    let mut outcomes = Vec::new();

    loop {
        if shared.abort.load(Ordering::SeqCst) {
            break;
        }
        let Some(item) = shared.queue.lock().await.pop_front() else {
            break;
        };

        let id = identify(&*shared.operation, &item);

        shared.limiter.acquire().await;

        let result = AssertUnwindSafe(shared.operation.apply(&item, &shared.token))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(())) => {
                shared.streak.store(0, Ordering::SeqCst);
                OperationOutcome::success(id)
            }
            Ok(Err(e)) => {
                track_failure(&shared, &e);
                debug!("Item {} failed (status {:?})", id, e.status());
                OperationOutcome::failure(id, e.to_string())
            }
            Err(panic) => {
                warn!("Operation panicked for item {}", id);
                OperationOutcome::failure(
                    id,
                    format!("operation panicked: {}", panic_message(panic.as_ref())),
                )
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

/// Update the connectivity streak for a failed item
///
/// Timeouts leave the streak unchanged; a remote status means the host was
/// reached, which resets it.
fn track_failure<T, O: ?Sized>(shared: &Shared<T, O>, error: &Error) {
    if error.is_connectivity() {
        let streak = shared.streak.fetch_add(1, Ordering::SeqCst) + 1;
        if streak >= shared.threshold && !shared.abort.swap(true, Ordering::SeqCst) {
            error!(
                "{} consecutive connectivity failures, stopping the run",
                streak
            );
        }
    } else if error.status().is_some() {
        shared.streak.store(0, Ordering::SeqCst);
    }
}

/// Identifier for an item; a panicking `identify` falls back to a placeholder
fn identify<T, O>(operation: &O, item: &T) -> String
where
    T: Send + Sync,
    O: ItemOperation<T> + ?Sized,
{
    std::panic::catch_unwind(AssertUnwindSafe(|| operation.identify(item)))
        .unwrap_or_else(|_| "[unidentified]".to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests;

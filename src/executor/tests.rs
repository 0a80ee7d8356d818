//! Tests for the executor module

use super::*;
use crate::error::{Error, Result};
use crate::http::{RateLimiter, RateLimiterConfig};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_test::assert_ok;

fn fast_limiter() -> RateLimiter {
    RateLimiter::new(&RateLimiterConfig::new(100_000, 100_000))
}

fn executor(max_concurrency: usize, threshold: usize) -> BulkExecutor {
    BulkExecutor::new(fast_limiter(), ExecutorConfig::new(max_concurrency, threshold))
}

fn token() -> Arc<str> {
    Arc::from("tok")
}

/// Records calls, tracks peak concurrency, and fails on request
#[derive(Default)]
struct ScriptedOp {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delay_ms: u64,
    panic_on: Option<u32>,
    not_found_on: Option<u32>,
}

#[async_trait]
impl ItemOperation<u32> for ScriptedOp {
    fn identify(&self, item: &u32) -> String {
        format!("item-{item}")
    }

    async fn apply(&self, item: &u32, token: &str) -> Result<()> {
        assert_eq!(token, "tok");
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_on == Some(*item) {
            panic!("boom on {item}");
        }
        if self.not_found_on == Some(*item) {
            return Err(Error::http_status(404, "{\"code\":\"NOT_FOUND\"}"));
        }
        Ok(())
    }
}

/// Fails with a connectivity error for every item in `unreachable`
struct FlakyNetworkOp {
    unreachable: Vec<u32>,
    calls: AtomicUsize,
}

#[async_trait]
impl ItemOperation<u32> for FlakyNetworkOp {
    fn identify(&self, item: &u32) -> String {
        item.to_string()
    }

    async fn apply(&self, item: &u32, _token: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.contains(item) {
            Err(Error::connectivity("connection refused"))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_every_item_gets_an_outcome() {
    let op = Arc::new(ScriptedOp::default());
    let outcomes = assert_ok!(executor(8, 10).execute((0..50).collect(), op.clone(), token()).await);

    assert_eq!(outcomes.len(), 50);
    assert!(outcomes.iter().all(|o| o.succeeded));
    assert_eq!(op.calls.load(Ordering::SeqCst), 50);
}

#[tokio::test]
async fn test_empty_batch() {
    let op = Arc::new(ScriptedOp::default());
    let outcomes = executor(8, 10)
        .execute(Vec::new(), op.clone(), token())
        .await
        .unwrap();
    assert!(outcomes.is_empty());
    assert_eq!(op.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_panicking_item_does_not_affect_siblings() {
    let op = Arc::new(ScriptedOp {
        panic_on: Some(3),
        delay_ms: 5,
        ..Default::default()
    });

    let outcomes = executor(4, 10)
        .execute((0..10).collect(), op, token())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 10);
    let failures: Vec<_> = outcomes.iter().filter(|o| o.is_failure()).collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].item_identifier, "item-3");
    assert!(failures[0]
        .error_detail
        .as_deref()
        .unwrap()
        .contains("operation panicked: boom on 3"));
}

#[tokio::test]
async fn test_remote_error_is_item_failure() {
    let op = Arc::new(ScriptedOp {
        not_found_on: Some(1),
        ..Default::default()
    });

    let outcomes = executor(2, 10)
        .execute(vec![0, 1, 2], op, token())
        .await
        .unwrap();

    let failed = outcomes.iter().find(|o| o.is_failure()).unwrap();
    assert_eq!(failed.item_identifier, "item-1");
    assert!(failed.error_detail.as_deref().unwrap().starts_with("HTTP 404"));
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let op = Arc::new(ScriptedOp {
        delay_ms: 10,
        ..Default::default()
    });

    executor(4, 10)
        .execute((0..40).collect(), op.clone(), token())
        .await
        .unwrap();

    let peak = op.peak.load(Ordering::SeqCst);
    assert!(peak <= 4, "peak concurrency was {peak}");
    assert!(peak >= 2, "work never overlapped");
}

#[tokio::test]
async fn test_rate_ceiling_spans_batches() {
    let limiter = RateLimiter::new(&RateLimiterConfig::ceiling(100));
    let executor = BulkExecutor::new(limiter, ExecutorConfig::new(100, 10));
    let op = Arc::new(ScriptedOp::default());

    let start = Instant::now();
    executor
        .execute((0..100).collect(), op.clone(), token())
        .await
        .unwrap();
    executor
        .execute((100..150).collect(), op.clone(), token())
        .await
        .unwrap();

    assert_eq!(op.calls.load(Ordering::SeqCst), 150);
    assert!(start.elapsed() >= Duration::from_secs(1));
}

// ============================================================================
// Connectivity Escalation Tests
// ============================================================================

#[tokio::test]
async fn test_consecutive_connectivity_failures_abort_the_batch() {
    let op = Arc::new(FlakyNetworkOp {
        unreachable: (0..100).collect(),
        calls: AtomicUsize::new(0),
    });

    let err = executor(1, 3)
        .execute((0..20).collect(), op.clone(), token())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Connectivity { .. }));
    assert!(err.is_fatal());
    assert_eq!(op.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_dispatch_keeps_outcomes_when_escalating() {
    let op = Arc::new(FlakyNetworkOp {
        unreachable: (2..100).collect(),
        calls: AtomicUsize::new(0),
    });

    let dispatch = executor(1, 3)
        .dispatch((0..10).collect(), op.clone(), token())
        .await;

    assert!(matches!(dispatch.aborted, Some(Error::Connectivity { .. })));
    assert_eq!(op.calls.load(Ordering::SeqCst), 5);
    assert_eq!(dispatch.outcomes.len(), 10);
    assert_eq!(dispatch.outcomes.iter().filter(|o| o.succeeded).count(), 2);

    let not_attempted: Vec<&str> = dispatch
        .outcomes
        .iter()
        .filter(|o| o.error_detail.as_deref().is_some_and(|d| d.starts_with("not attempted")))
        .map(|o| o.item_identifier.as_str())
        .collect();
    assert_eq!(not_attempted, vec!["5", "6", "7", "8", "9"]);
}

#[tokio::test]
async fn test_success_resets_connectivity_streak() {
    let op = Arc::new(FlakyNetworkOp {
        unreachable: vec![0, 1, 3, 4, 6, 7],
        calls: AtomicUsize::new(0),
    });
    let executor = executor(1, 3);

    let outcomes = executor
        .execute((0..9).collect(), op, token())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 9);
    assert_eq!(outcomes.iter().filter(|o| o.is_failure()).count(), 6);
    assert_eq!(executor.connectivity_streak(), 0);
}

#[tokio::test]
async fn test_connectivity_streak_spans_batches() {
    let op = Arc::new(FlakyNetworkOp {
        unreachable: vec![0, 1, 2],
        calls: AtomicUsize::new(0),
    });
    let executor = executor(1, 3);

    executor
        .execute(vec![0, 1], op.clone(), token())
        .await
        .unwrap();
    assert_eq!(executor.connectivity_streak(), 2);

    let err = executor.execute(vec![2], op, token()).await.unwrap_err();
    assert!(err.is_connectivity());
}

#[tokio::test]
async fn test_dyn_operation() {
    let op: Arc<dyn ItemOperation<u32>> = Arc::new(ScriptedOp::default());
    let outcomes = executor(2, 10)
        .execute(vec![7], op, token())
        .await
        .unwrap();
    assert_eq!(outcomes[0].item_identifier, "item-7");
}

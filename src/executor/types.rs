//! Executor types
//!
//! The per-item operation contract and pool configuration.

use crate::error::{Error, Result};
use crate::types::OperationOutcome;
use async_trait::async_trait;

/// One remote operation applied to one item
#[async_trait]
pub trait ItemOperation<T: Send + Sync>: Send + Sync + 'static {
    /// Identifier used in outcomes and logs
    fn identify(&self, item: &T) -> String;

    /// Perform the remote call with the given bearer token
    async fn apply(&self, item: &T, token: &str) -> Result<()>;
}

/// Worker pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Upper bound on workers per batch
    pub max_concurrency: usize,
    /// Consecutive connectivity failures that escalate to a fatal error
    pub connectivity_failure_threshold: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 100,
            connectivity_failure_threshold: 10,
        }
    }
}

impl ExecutorConfig {
    /// Create a config
    pub fn new(max_concurrency: usize, connectivity_failure_threshold: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            connectivity_failure_threshold: connectivity_failure_threshold.max(1),
        }
    }
}

/// Outcomes of one batch, plus the escalation that cut it short
#[derive(Debug)]
pub struct Dispatch {
    /// One outcome per item, in completion order
    pub outcomes: Vec<OperationOutcome>,
    /// Set when consecutive connectivity failures stopped the batch
    pub aborted: Option<Error>,
}

impl Dispatch {
    /// Outcomes, or the escalation error if the batch was cut short
    pub fn into_result(self) -> Result<Vec<OperationOutcome>> {
        match self.aborted {
            Some(e) => Err(e),
            None => Ok(self.outcomes),
        }
    }
}

//! Common types used throughout idm-bulk
//!
//! Shared type aliases, the per-item outcome record, and clock helpers.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Operation Outcome
// ============================================================================

/// Result of one item in a batch
///
/// Exactly one of `succeeded` / `skipped` / failed (neither flag set) holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    /// Identifier used in logs (user id, username, or CSV line)
    pub item_identifier: String,
    /// Remote operation completed with its success status
    pub succeeded: bool,
    /// Item did not qualify and was never dispatched
    pub skipped: bool,
    /// Failure detail (status and body, or error text)
    pub error_detail: Option<String>,
}

impl OperationOutcome {
    /// Create a success outcome
    pub fn success(item: impl Into<String>) -> Self {
        Self {
            item_identifier: item.into(),
            succeeded: true,
            skipped: false,
            error_detail: None,
        }
    }

    /// Create a failure outcome
    pub fn failure(item: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            item_identifier: item.into(),
            succeeded: false,
            skipped: false,
            error_detail: Some(detail.into()),
        }
    }

    /// Create a skipped outcome
    pub fn skipped(item: impl Into<String>) -> Self {
        Self {
            item_identifier: item.into(),
            succeeded: false,
            skipped: true,
            error_detail: None,
        }
    }

    /// Check if this outcome is a failure
    pub fn is_failure(&self) -> bool {
        !self.succeeded && !self.skipped
    }
}

// ============================================================================
// Clock helpers
// ============================================================================

/// Milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Epoch milliseconds for `days` days before `now_ms`
pub fn days_before_ms(now_ms: i64, days: u32) -> i64 {
    now_ms - i64::from(days) * 24 * 60 * 60 * 1000
}

/// Parse an RFC 3339 timestamp into epoch milliseconds
pub fn parse_instant_ms(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
}

//! Eligibility predicates over listed user objects
//!
//! Both predicates are pure: they read a couple of fields from the JSON item
//! and compare instants against a threshold computed once per run.

use crate::types::{days_before_ms, parse_instant_ms, JsonValue};

/// Lifecycle status that makes an account eligible for unverified cleanup
pub const VERIFICATION_REQUIRED: &str = "verification required";

/// Decides whether an item takes part in the operation
pub trait ItemFilter<T>: Send + Sync {
    /// Check if the item qualifies
    fn qualifies(&self, item: &T) -> bool;
}

/// Filter that lets every item through
#[derive(Debug, Clone, Copy, Default)]
pub struct PassAll;

impl<T> ItemFilter<T> for PassAll {
    fn qualifies(&self, _item: &T) -> bool {
        true
    }
}

/// Conditional-delete eligibility policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPredicate {
    /// Last sign-on strictly before the threshold
    Inactivity {
        /// Epoch millis cutoff
        threshold_ms: i64,
        /// Accounts that never signed on qualify too
        include_never_signed_on: bool,
    },
    /// Still awaiting verification and created strictly before the threshold
    UnverifiedAge {
        /// Epoch millis cutoff
        threshold_ms: i64,
    },
}

impl FilterPredicate {
    /// Inactive for more than `days` days as of `now_ms`
    pub fn inactive_for(days: u32, include_never_signed_on: bool, now_ms: i64) -> Self {
        Self::Inactivity {
            threshold_ms: days_before_ms(now_ms, days),
            include_never_signed_on,
        }
    }

    /// Unverified and older than `days` days as of `now_ms`
    pub fn unverified_for(days: u32, now_ms: i64) -> Self {
        Self::UnverifiedAge {
            threshold_ms: days_before_ms(now_ms, days),
        }
    }

    /// Cutoff instant
    pub fn threshold_ms(&self) -> i64 {
        match self {
            Self::Inactivity { threshold_ms, .. } | Self::UnverifiedAge { threshold_ms } => {
                *threshold_ms
            }
        }
    }
}

impl ItemFilter<JsonValue> for FilterPredicate {
    fn qualifies(&self, item: &JsonValue) -> bool {
        match *self {
            Self::Inactivity {
                threshold_ms,
                include_never_signed_on,
            } => inactivity_qualifies(item, threshold_ms, include_never_signed_on),
            Self::UnverifiedAge { threshold_ms } => unverified_age_qualifies(item, threshold_ms),
        }
    }
}

/// Inactivity policy
///
/// No recorded sign-on qualifies only with `include_never_signed_on`. A
/// recorded sign-on that cannot be parsed never qualifies.
pub fn inactivity_qualifies(item: &JsonValue, threshold_ms: i64, include_never_signed_on: bool) -> bool {
    match item.pointer("/lastSignOn/at") {
        None | Some(JsonValue::Null) => include_never_signed_on,
        Some(at) => at
            .as_str()
            .and_then(parse_instant_ms)
            .is_some_and(|signed_on| signed_on < threshold_ms),
    }
}

/// Unverified-age policy
///
/// Any status other than "verification required" never qualifies.
pub fn unverified_age_qualifies(item: &JsonValue, threshold_ms: i64) -> bool {
    let awaiting_verification = item
        .pointer("/lifecycle/status")
        .and_then(JsonValue::as_str)
        .is_some_and(|status| normalize_status(status) == VERIFICATION_REQUIRED);
    if !awaiting_verification {
        return false;
    }

    item.get("createdAt")
        .and_then(JsonValue::as_str)
        .and_then(parse_instant_ms)
        .is_some_and(|created| created < threshold_ms)
}

/// `VERIFICATION_REQUIRED` and `Verification Required` compare equal
fn normalize_status(status: &str) -> String {
    status.trim().replace('_', " ").to_lowercase()
}

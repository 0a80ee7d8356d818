//! Tests for the filter module

use super::*;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use test_case::test_case;

const NOW_MS: i64 = 1_760_000_000_000;

fn days_ago(days: i64) -> String {
    let now = Utc.timestamp_millis_opt(NOW_MS).unwrap();
    (now - Duration::days(days)).to_rfc3339()
}

fn unverified_user(status: &str, created_days_ago: i64) -> Value {
    json!({
        "id": "u1",
        "lifecycle": {"status": status},
        "createdAt": days_ago(created_days_ago)
    })
}

// ============================================================================
// UnverifiedAge Tests
// ============================================================================

#[test_case("VERIFICATION_REQUIRED", 40 => true; "old unverified account")]
#[test_case("VERIFICATION_REQUIRED", 10 => false; "recent unverified account")]
#[test_case("ENABLED", 40 => false; "verified account never qualifies")]
#[test_case("verification required", 40 => true; "human readable status")]
#[test_case("Verification_Required", 31 => true; "mixed case status")]
fn test_unverified_age(status: &str, created_days_ago: i64) -> bool {
    let predicate = FilterPredicate::unverified_for(30, NOW_MS);
    predicate.qualifies(&unverified_user(status, created_days_ago))
}

#[test]
fn test_unverified_missing_or_bad_created_at_is_skipped() {
    let threshold = NOW_MS;
    let missing = json!({"lifecycle": {"status": "VERIFICATION_REQUIRED"}});
    let garbled = json!({
        "lifecycle": {"status": "VERIFICATION_REQUIRED"},
        "createdAt": "last tuesday"
    });

    assert!(!unverified_age_qualifies(&missing, threshold));
    assert!(!unverified_age_qualifies(&garbled, threshold));
}

#[test]
fn test_unverified_missing_status_never_qualifies() {
    let user = json!({"createdAt": days_ago(400)});
    assert!(!unverified_age_qualifies(&user, NOW_MS));
}

// ============================================================================
// Inactivity Tests
// ============================================================================

#[test_case(Some(100), false => true; "long inactive")]
#[test_case(Some(5), false => false; "recently active")]
#[test_case(None, false => false; "never signed on excluded")]
#[test_case(None, true => true; "never signed on included")]
#[test_case(Some(100), true => true; "include flag does not block inactive")]
fn test_inactivity(last_sign_on_days_ago: Option<i64>, include_never: bool) -> bool {
    let user = match last_sign_on_days_ago {
        Some(days) => json!({"id": "u1", "lastSignOn": {"at": days_ago(days)}}),
        None => json!({"id": "u1"}),
    };
    FilterPredicate::inactive_for(90, include_never, NOW_MS).qualifies(&user)
}

#[test]
fn test_inactivity_null_sign_on_counts_as_never() {
    let user = json!({"lastSignOn": {"at": null}});
    assert!(inactivity_qualifies(&user, NOW_MS, true));
    assert!(!inactivity_qualifies(&user, NOW_MS, false));
}

#[test]
fn test_inactivity_threshold_is_strict() {
    let at = Utc.timestamp_millis_opt(NOW_MS).unwrap().to_rfc3339();
    let user = json!({"lastSignOn": {"at": at}});
    assert!(!inactivity_qualifies(&user, NOW_MS, false));
    assert!(inactivity_qualifies(&user, NOW_MS + 1, false));
}

#[test]
fn test_inactivity_unparseable_date_does_not_qualify() {
    let user = json!({"lastSignOn": {"at": "not a date"}});
    assert!(!inactivity_qualifies(&user, NOW_MS, true));
}

// ============================================================================
// Misc
// ============================================================================

#[test]
fn test_threshold_computation() {
    let predicate = FilterPredicate::inactive_for(1, false, NOW_MS);
    assert_eq!(predicate.threshold_ms(), NOW_MS - 86_400_000);
}

#[test]
fn test_pass_all() {
    assert!(ItemFilter::<Value>::qualifies(&PassAll, &json!({})));
    assert!(PassAll.qualifies(&42_u8));
}

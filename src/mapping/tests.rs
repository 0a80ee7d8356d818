//! Tests for the mapping module

use super::*;
use crate::source::Record;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn config() -> MapperConfig {
    MapperConfig::new("default-pop", false)
}

fn record(pairs: &[(&str, &str)]) -> Record {
    Record::from_pairs(2, pairs.iter().copied())
}

// ============================================================================
// AttributeTree Tests
// ============================================================================

#[test]
fn test_insert_path_nests_on_segments() {
    let mut tree = AttributeTree::new();
    tree.insert_path(&["a", "b", "c"], json!("x"));

    assert_eq!(tree.to_json(), json!({"a": {"b": {"c": "x"}}}));
    assert_eq!(tree.get_value("a.b.c"), Some(&json!("x")));
    assert!(matches!(tree.get_path("a.b"), Some(AttributeNode::Tree(_))));
    assert_eq!(tree.get_value("a.b"), None);
}

#[test]
fn test_insert_path_last_write_wins() {
    let mut tree = AttributeTree::new();
    tree.insert_path(&["name"], json!("flat"));
    tree.insert_path(&["name", "given"], json!("Alice"));
    assert_eq!(tree.to_json(), json!({"name": {"given": "Alice"}}));

    tree.insert_path(&["name"], json!("flat again"));
    assert_eq!(tree.to_json(), json!({"name": "flat again"}));

    tree.insert_path(&["name", "parts", "family"], json!("Smith"));
    assert_eq!(tree.to_json(), json!({"name": {"parts": {"family": "Smith"}}}));
}

#[test]
fn test_prune_removes_empty_branches() {
    let mut tree = AttributeTree::new();
    let mut empty_leafless = AttributeTree::new();
    empty_leafless.insert("b", AttributeNode::Tree(AttributeTree::new()));
    tree.insert("a", AttributeNode::Tree(empty_leafless));
    tree.insert_path(&["keep", "me"], json!(1));

    assert!(!tree.prune());
    assert_eq!(tree.to_json(), json!({"keep": {"me": 1}}));

    let mut only_empty = AttributeTree::new();
    only_empty.insert("x", AttributeNode::Tree(AttributeTree::new()));
    assert!(only_empty.prune());
    assert!(only_empty.is_empty());
}

#[test]
fn test_empty_segments_list_is_ignored() {
    let mut tree = AttributeTree::new();
    tree.insert_path(&[], json!("x"));
    assert!(tree.is_empty());
}

// ============================================================================
// map_record Tests
// ============================================================================

#[test]
fn test_map_record_full_example() {
    let row = record(&[
        ("username", "alice"),
        ("name.given", "Alice"),
        ("name.family", "Smith"),
        ("enabled", "TRUE"),
        ("population", "pop-1"),
    ]);

    let body = map_record(&row, &config()).to_json();

    assert_eq!(
        body,
        json!({
            "username": "alice",
            "name": {"given": "Alice", "family": "Smith"},
            "enabled": true,
            "population": {"id": "pop-1"}
        })
    );
}

#[test]
fn test_empty_values_never_create_objects() {
    let row = record(&[("username", "bob"), ("a.b", ""), ("address.locality", "")]);

    let body = map_record(&row, &config()).to_json();

    assert_eq!(
        body,
        json!({"username": "bob", "population": {"id": "default-pop"}})
    );
    assert!(body.get("a").is_none());
    assert!(body.get("address").is_none());
}

#[test]
fn test_population_falls_back_to_default() {
    let blank = record(&[("username", "c"), ("population", "")]);
    let absent = record(&[("username", "c")]);

    for row in [blank, absent] {
        let tree = map_record(&row, &config());
        assert_eq!(tree.get_value("population.id"), Some(&json!("default-pop")));
    }
}

#[test]
fn test_enabled_only_when_column_present() {
    let without = map_record(&record(&[("username", "d")]), &config());
    assert_eq!(without.get_value("enabled"), None);

    let falsy = map_record(&record(&[("username", "d"), ("enabled", "yes")]), &config());
    assert_eq!(falsy.get_value("enabled"), Some(&Value::Bool(false)));

    let blank = map_record(&record(&[("username", "d"), ("enabled", "")]), &config());
    assert_eq!(blank.get_value("enabled"), Some(&Value::Bool(false)));

    let truthy = map_record(&record(&[("username", "d"), ("enabled", "True")]), &config());
    assert_eq!(truthy.get_value("enabled"), Some(&Value::Bool(true)));
}

#[test]
fn test_password_carries_force_change_flag() {
    let row = record(&[("username", "e"), ("password", "S3cret!")]);

    let relaxed = map_record(&row, &config()).to_json();
    assert_eq!(
        relaxed["password"],
        json!({"value": "S3cret!", "forceChange": false})
    );

    let strict = map_record(&row, &MapperConfig::new("default-pop", true)).to_json();
    assert_eq!(strict["password"]["forceChange"], json!(true));
}

#[test]
fn test_blank_password_is_omitted() {
    let row = record(&[("username", "f"), ("password", "")]);
    let body = map_record(&row, &config()).to_json();
    assert!(body.get("password").is_none());
}

#[test]
fn test_duplicate_columns_rightmost_value_wins() {
    let row = record(&[("email", "first@x.io"), ("email", "second@x.io")]);
    let tree = map_record(&row, &config());
    assert_eq!(tree.get_value("email"), Some(&json!("second@x.io")));
}

#[test]
fn test_duplicate_columns_resolve_alike_for_every_key() {
    // An empty rightmost column wins for ordinary and reserved keys
    let row = record(&[
        ("email", "a@x.io"),
        ("password", "Secret1!"),
        ("population", "pop-1"),
        ("email", ""),
        ("password", ""),
        ("population", ""),
    ]);
    let tree = map_record(&row, &config());
    assert_eq!(tree.get_value("email"), None);
    assert_eq!(tree.get_path("password"), None);
    assert_eq!(tree.get_value("population.id"), Some(&json!("default-pop")));

    // A populated rightmost column wins over an empty earlier one
    let row = record(&[
        ("email", ""),
        ("password", ""),
        ("email", "b@x.io"),
        ("password", "Secret2!"),
    ]);
    let tree = map_record(&row, &config());
    assert_eq!(tree.get_value("email"), Some(&json!("b@x.io")));
    assert_eq!(tree.get_value("password.value"), Some(&json!("Secret2!")));
}

#[test]
fn test_reserved_keys() {
    assert!(is_reserved("password"));
    assert!(is_reserved("population"));
    assert!(is_reserved("enabled"));
    assert!(!is_reserved("username"));
    assert!(!is_reserved("password.value"));
}

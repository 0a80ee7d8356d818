//! Flat record → user payload
//!
//! Generic columns nest on `.`; the reserved columns `password`,
//! `population` and `enabled` get bespoke handling.
//!
//! Duplicate columns resolve the same way for every key: the rightmost
//! column supplies the value, even when that value is empty. An empty
//! resolved value is then treated like any other empty cell.

use super::tree::{AttributeNode, AttributeTree};
use crate::source::Record;
use serde_json::Value;
use std::collections::HashSet;

/// Columns excluded from generic path nesting
pub const RESERVED_KEYS: [&str; 3] = ["password", "population", "enabled"];

/// Settings applied to every mapped record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// Population used when the population column is empty or absent
    pub default_population_id: String,
    /// `forceChange` flag attached to imported passwords
    pub force_password_change: bool,
}

impl MapperConfig {
    /// Create a mapper config
    pub fn new(default_population_id: impl Into<String>, force_password_change: bool) -> Self {
        Self {
            default_population_id: default_population_id.into(),
            force_password_change,
        }
    }
}

/// Check whether a column receives bespoke handling
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Convert one record into a nested attribute tree
pub fn map_record(record: &Record, config: &MapperConfig) -> AttributeTree {
    let mut tree = AttributeTree::new();

    let mut seen = HashSet::new();
    for (path, _) in record.iter() {
        if is_reserved(path) || !seen.insert(path) {
            continue;
        }
        let value = record.get(path).unwrap_or_default();
        if value.is_empty() {
            continue;
        }
        let segments: Vec<&str> = path.split('.').collect();
        tree.insert_path(&segments, Value::String(value.to_string()));
    }

    // Absent column means no opinion; the remote default applies
    if record.has_column("enabled") {
        let enabled = record
            .get("enabled")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        tree.insert("enabled", AttributeNode::Value(Value::Bool(enabled)));
    }

    let population_id = record
        .get("population")
        .filter(|v| !v.is_empty())
        .unwrap_or(&config.default_population_id);
    let mut population = AttributeTree::new();
    population.insert(
        "id",
        AttributeNode::Value(Value::String(population_id.to_string())),
    );
    tree.insert("population", AttributeNode::Tree(population));

    if let Some(password) = record.get("password").filter(|v| !v.is_empty()) {
        let mut secret = AttributeTree::new();
        secret.insert("value", AttributeNode::Value(Value::String(password.to_string())));
        secret.insert(
            "forceChange",
            AttributeNode::Value(Value::Bool(config.force_password_change)),
        );
        tree.insert("password", AttributeNode::Tree(secret));
    }

    tree.prune();
    tree
}

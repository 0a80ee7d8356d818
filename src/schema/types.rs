//! Schema types

use serde::Deserialize;
use std::collections::BTreeSet;

/// Columns accepted even though the attribute schema does not list them
pub const ALWAYS_ACCEPTED: [&str; 5] = [
    "password",
    "mfaEmail1",
    "mfaEmail2",
    "mfaSmsVoice1",
    "mfaSmsVoice2",
];

/// Attribute kind as reported by the schema endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeKind {
    String,
    Complex,
    Boolean,
    Json,
    #[serde(other)]
    Other,
}

/// One attribute definition from `/schemas/{id}/attributes`
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,
    /// Attribute kind
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    /// Sub-attributes of a `COMPLEX` attribute
    #[serde(rename = "subAttributes", default)]
    pub sub_attributes: Vec<SubAttribute>,
}

/// Sub-attribute of a complex attribute
#[derive(Debug, Clone, Deserialize)]
pub struct SubAttribute {
    /// Sub-attribute name
    pub name: String,
}

impl AttributeDefinition {
    /// Dotted paths a CSV header may use for this attribute
    pub fn paths(&self) -> Vec<String> {
        match self.kind {
            AttributeKind::Complex => self
                .sub_attributes
                .iter()
                .map(|sub| format!("{}.{}", self.name, sub.name))
                .collect(),
            _ => vec![self.name.clone()],
        }
    }
}

/// Attribute paths known to the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAttributes {
    paths: BTreeSet<String>,
}

impl UserAttributes {
    /// Build from attribute definitions, adding the always-accepted columns
    pub fn from_definitions<'a>(definitions: impl IntoIterator<Item = &'a AttributeDefinition>) -> Self {
        let mut paths: BTreeSet<String> = definitions
            .into_iter()
            .flat_map(AttributeDefinition::paths)
            .collect();
        paths.extend(ALWAYS_ACCEPTED.iter().map(|s| (*s).to_string()));
        Self { paths }
    }

    /// Check whether a header names a known attribute path
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Iterate known paths in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Number of known paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if no paths are known
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A population in the environment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Population {
    /// Population id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
}

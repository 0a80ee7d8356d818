//! Nested attribute tree
//!
//! An explicit tree built by descending dotted paths segment by segment. Empty
//! subtrees are removed by [`AttributeTree::prune`], so a finished tree never
//! holds an object node without at least one populated leaf below it.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A node in the attribute tree
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeNode {
    /// Leaf value
    Value(Value),
    /// Nested object
    Tree(AttributeTree),
}

/// Attribute name → node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTree {
    children: BTreeMap<String, AttributeNode>,
}

impl AttributeTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a top-level node, replacing whatever was there
    pub fn insert(&mut self, key: impl Into<String>, node: AttributeNode) {
        self.children.insert(key.into(), node);
    }

    /// Set a leaf at `segments`, creating intermediate objects on the way
    ///
    /// A scalar sitting where an intermediate object is needed is replaced,
    /// and a later scalar replaces an earlier object: the last write wins at
    /// every level.
    pub fn insert_path(&mut self, segments: &[&str], value: Value) {
        match segments {
            [] => {}
            [leaf] => self.insert(*leaf, AttributeNode::Value(value)),
            [parent, rest @ ..] => {
                let node = self
                    .children
                    .entry((*parent).to_string())
                    .or_insert_with(|| AttributeNode::Tree(AttributeTree::new()));
                match node {
                    AttributeNode::Tree(tree) => tree.insert_path(rest, value),
                    AttributeNode::Value(_) => {
                        let mut tree = AttributeTree::new();
                        tree.insert_path(rest, value);
                        *node = AttributeNode::Tree(tree);
                    }
                }
            }
        }
    }

    /// Look up a node by dotted path
    pub fn get_path(&self, path: &str) -> Option<&AttributeNode> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.children.get(first)?;
        for segment in segments {
            match node {
                AttributeNode::Tree(tree) => node = tree.children.get(segment)?,
                AttributeNode::Value(_) => return None,
            }
        }
        Some(node)
    }

    /// Leaf value by dotted path
    pub fn get_value(&self, path: &str) -> Option<&Value> {
        match self.get_path(path)? {
            AttributeNode::Value(value) => Some(value),
            AttributeNode::Tree(_) => None,
        }
    }

    /// Remove every object node with no populated leaf below it
    ///
    /// Returns whether the tree itself ended up empty.
    pub fn prune(&mut self) -> bool {
        self.children.retain(|_, node| match node {
            AttributeNode::Value(_) => true,
            AttributeNode::Tree(tree) => !tree.prune(),
        });
        self.children.is_empty()
    }

    /// Check if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of top-level nodes
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Convert to a JSON object
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, node) in &self.children {
            let value = match node {
                AttributeNode::Value(value) => value.clone(),
                AttributeNode::Tree(tree) => tree.to_json(),
            };
            map.insert(key.clone(), value);
        }
        Value::Object(map)
    }
}

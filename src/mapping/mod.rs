//! Record mapping
//!
//! Turns a flat record keyed by dotted attribute paths into the nested JSON
//! body the import endpoint expects.
//!
//! # Example
//!
//! A row `username=alice, name.given=Alice, name.family=Smith, enabled=TRUE,
//! population=pop-1` maps to:
//!
//! ```json
//! {"username": "alice", "name": {"given": "Alice", "family": "Smith"},
//!  "enabled": true, "population": {"id": "pop-1"}}
//! ```

mod mapper;
mod tree;

pub use mapper::{is_reserved, map_record, MapperConfig, RESERVED_KEYS};
pub use tree::{AttributeNode, AttributeTree};

#[cfg(test)]
mod tests;

//! CLI module
//!
//! Command-line interface for bulk runs.
//!
//! # Commands
//!
//! - `check` - Authenticate and report the existing user count
//! - `delete all|group|inactive|unverified` - Bulk delete
//! - `import` - Bulk import from CSV

mod commands;
mod runner;

pub use commands::{Cli, Commands, DeleteMode};
pub use runner::Runner;

#[cfg(test)]
mod tests;

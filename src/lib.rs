// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # idm-bulk
//!
//! Concurrent bulk lifecycle operations (delete, import) against an identity
//! management API, under a per-second call ceiling and a short-lived bearer
//! credential.
//!
//! ## Features
//!
//! - **Credential lifecycle**: Basic/Post auth-mode discovery, proactive refresh
//! - **Record sources**: Cursor-linked listings and chunked CSV files
//! - **Attribute mapping**: Dotted CSV headers to nested user payloads
//! - **Bounded dispatch**: Fixed worker pool under a shared rate limiter
//! - **Failure isolation**: Per-item outcomes, separate failure-detail log
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use idm_bulk::{config::RunConfig, cli::{Cli, Runner}};
//!
//! #[tokio::main]
//! async fn main() -> idm_bulk::Result<()> {
//!     let cli = Cli::parse_from(["idm-bulk", "-C", "run.yaml", "delete", "all"]);
//!     Runner::new(cli).run().await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  batch   ┌──────────┐ qualifying ┌──────────────┐
//! │ RecordSource │ ───────▶ │  Filter  │ ─────────▶ │ BulkExecutor │
//! │ paged / CSV  │          └──────────┘            │ pool + limit │
//! └──────▲───────┘                                  └──────┬───────┘
//!        │ token                                   outcomes │
//! ┌──────┴───────────┐                          ┌───────────▼──────┐
//! │ CredentialBroker │ ◀── refresh if stale ─── │ ResultAggregator │
//! └──────────────────┘                          └──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and clock helpers
pub mod types;

/// Run configuration
pub mod config;

/// Credential acquisition and refresh
pub mod auth;

/// HTTP client and rate limiting
pub mod http;

/// Paginated and CSV record sources
pub mod source;

/// Flat record to nested attribute mapping
pub mod mapping;

/// Per-item eligibility filtering
pub mod filter;

/// Bounded-concurrency dispatch
pub mod executor;

/// Counters and failure sinks
pub mod report;

/// Remote user operations
pub mod operations;

/// Import preflight against the environment schema
pub mod schema;

/// Run orchestration
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Authentication module
//!
//! Client-credentials token acquisition against the environment's token
//! endpoint. The broker discovers whether the worker client expects Basic or
//! Post client authentication and keeps the bearer token fresh between
//! batches.

mod broker;
mod types;

pub use broker::{basic_header, CredentialBroker};
pub use types::{AuthMode, Credential};

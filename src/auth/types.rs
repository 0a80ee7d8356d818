//! Credential types
//!
//! The credential is created once per run, refreshed in place by the broker,
//! and read by every dispatched operation through a token snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How client credentials are presented to the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `Authorization: Basic base64(id:secret)`
    Basic,
    /// `client_id` and `client_secret` in the form body
    Post,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Basic => write!(f, "basic"),
            AuthMode::Post => write!(f, "post"),
        }
    }
}

/// Bearer credential plus the client identity used to renew it
#[derive(Clone)]
pub struct Credential {
    /// Worker client id
    pub client_id: String,
    /// Worker client secret
    pub client_secret: String,
    /// Mode that succeeded during discovery
    pub auth_mode: AuthMode,
    /// Current bearer token
    pub token: String,
    /// When the current token was requested (epoch ms)
    pub issued_at_ms: i64,
    /// Age after which the token is renewed (ms)
    pub refresh_interval_ms: i64,
}

impl Credential {
    /// Check if the token must be renewed before the next batch
    pub fn is_stale(&self, now_ms: i64) -> bool {
        now_ms > self.refresh_deadline_ms()
    }

    /// Instant after which the token is stale (epoch ms)
    pub fn refresh_deadline_ms(&self) -> i64 {
        self.issued_at_ms + self.refresh_interval_ms
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("auth_mode", &self.auth_mode)
            .field("issued_at_ms", &self.issued_at_ms)
            .field("refresh_interval_ms", &self.refresh_interval_ms)
            .finish_non_exhaustive()
    }
}

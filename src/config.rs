//! Run configuration
//!
//! A single YAML document describes the target environment, the worker
//! credentials and the tuning knobs for a bulk run.

use crate::auth::AuthMode;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete run configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Environment identifier
    pub environment_id: String,

    /// Geography suffix used in host names (e.g. ".com", ".eu")
    #[serde(default = "default_geography")]
    pub geography: String,

    /// Worker client id
    pub client_id: String,

    /// Worker client secret
    pub client_secret: String,

    /// Token endpoint auth mode; probed when absent
    #[serde(default)]
    pub auth_mode: Option<AuthMode>,

    /// Token refresh interval in minutes (1..=59)
    #[serde(default = "default_token_refresh_minutes")]
    pub token_refresh_minutes: u64,

    /// Population assigned to imported users with an empty population column
    #[serde(default)]
    pub default_population_id: Option<String>,

    /// Force imported users to change their password at first login
    #[serde(default)]
    pub force_password_change: bool,

    /// CSV input for imports
    #[serde(default)]
    pub csv_path: Option<PathBuf>,

    /// Worker pool size
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Call-rate ceiling across all workers
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Consecutive item-level connectivity failures that abort the run
    #[serde(default = "default_connectivity_failure_threshold")]
    pub connectivity_failure_threshold: usize,

    /// Failure-detail log file
    #[serde(default = "default_failure_log")]
    pub failure_log: PathBuf,

    /// Override for the token host (scheme + host, no path)
    #[serde(default)]
    pub auth_base_url: Option<String>,

    /// Override for the API host (scheme + host, no path)
    #[serde(default)]
    pub api_base_url: Option<String>,
}

fn default_geography() -> String {
    ".com".to_string()
}

fn default_token_refresh_minutes() -> u64 {
    30
}

fn default_max_concurrency() -> usize {
    100
}

fn default_requests_per_second() -> u32 {
    100
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_connectivity_failure_threshold() -> usize {
    10
}

fn default_failure_log() -> PathBuf {
    PathBuf::from("idm-bulk-failures.log")
}

impl RunConfig {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> Result<()> {
        if self.environment_id.trim().is_empty() {
            return Err(Error::missing_field("environment_id"));
        }
        if self.client_id.trim().is_empty() {
            return Err(Error::missing_field("client_id"));
        }
        if self.client_secret.is_empty() {
            return Err(Error::missing_field("client_secret"));
        }
        if !(1..60).contains(&self.token_refresh_minutes) {
            return Err(Error::invalid_value(
                "token_refresh_minutes",
                "must be greater than 0 and less than 60",
            ));
        }
        if self.max_concurrency == 0 {
            return Err(Error::invalid_value("max_concurrency", "must be at least 1"));
        }
        if self.requests_per_second == 0 {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be at least 1",
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "request_timeout_seconds",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Token endpoint URL
    pub fn token_url(&self) -> String {
        let host = self
            .auth_base_url
            .clone()
            .unwrap_or_else(|| format!("https://auth.pingone{}", self.geography));
        format!(
            "{}/{}/as/token",
            host.trim_end_matches('/'),
            self.environment_id
        )
    }

    /// Root URL for environment resources
    pub fn api_root(&self) -> String {
        let host = self
            .api_base_url
            .clone()
            .unwrap_or_else(|| format!("https://api.pingone{}", self.geography));
        format!(
            "{}/v1/environments/{}",
            host.trim_end_matches('/'),
            self.environment_id
        )
    }

    /// Token refresh interval
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.token_refresh_minutes * 60)
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

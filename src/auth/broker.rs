//! Credential broker implementation
//!
//! Discovers the token endpoint auth mode, acquires the bearer token and
//! renews it once it is older than the configured refresh interval.

use super::types::{AuthMode, Credential};
use crate::error::{Error, Result};
use crate::types::now_ms;
use base64::Engine as _;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Owns the run's credential
///
/// Only the orchestrator holds the broker; workers receive a token snapshot
/// taken after [`CredentialBroker::refresh_if_stale`].
pub struct CredentialBroker {
    /// HTTP client for token requests
    http_client: Client,
    /// Token endpoint URL
    token_url: String,
    /// Current credential
    credential: Credential,
}

impl CredentialBroker {
    /// Acquire a token, trying Basic first and then Post
    pub async fn acquire(
        http_client: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_interval: Duration,
    ) -> Result<Self> {
        let token_url = token_url.into();
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        let refresh_interval_ms = validate_interval(refresh_interval)?;

        let mut acquired = None;
        for mode in [AuthMode::Basic, AuthMode::Post] {
            let issued_at_ms = now_ms();
            match request_token(&http_client, &token_url, &client_id, &client_secret, mode).await {
                Ok(token) => {
                    info!("Client credentials accepted with {} auth", mode);
                    acquired = Some((mode, token, issued_at_ms));
                    break;
                }
                Err(e) => warn!("Token request with {} auth failed: {}", mode, e),
            }
        }

        let (auth_mode, token, issued_at_ms) = acquired.ok_or_else(|| {
            Error::auth("client rejected with both BASIC and POST authentication")
        })?;

        Ok(Self {
            http_client,
            token_url,
            credential: Credential {
                client_id,
                client_secret,
                auth_mode,
                token,
                issued_at_ms,
                refresh_interval_ms,
            },
        })
    }

    /// Acquire a token with an already known auth mode
    pub async fn acquire_with_mode(
        http_client: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_mode: AuthMode,
        refresh_interval: Duration,
    ) -> Result<Self> {
        let token_url = token_url.into();
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        let refresh_interval_ms = validate_interval(refresh_interval)?;

        let issued_at_ms = now_ms();
        let token = request_token(&http_client, &token_url, &client_id, &client_secret, auth_mode)
            .await
            .map_err(|e| match e {
                Error::HttpStatus { status, .. } => {
                    Error::auth(format!("token endpoint returned {status} for {auth_mode} auth"))
                }
                other => other,
            })?;
        info!("Client credentials accepted with {} auth", auth_mode);

        Ok(Self {
            http_client,
            token_url,
            credential: Credential {
                client_id,
                client_secret,
                auth_mode,
                token,
                issued_at_ms,
                refresh_interval_ms,
            },
        })
    }

    /// Wrap an existing credential
    pub fn from_credential(
        http_client: Client,
        token_url: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            http_client,
            token_url: token_url.into(),
            credential,
        }
    }

    /// Renew the token if `now_ms` is past the refresh deadline
    ///
    /// Returns whether a new token was acquired. Calls already in flight keep
    /// the token they were dispatched with.
    pub async fn refresh_if_stale(&mut self, now_ms: i64) -> Result<bool> {
        if !self.credential.is_stale(now_ms) {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Renew the token unconditionally with the determined auth mode
    pub async fn refresh(&mut self) -> Result<()> {
        let issued_at_ms = now_ms();
        info!("Refreshing access token at {}", issued_at_ms);

        let cred = &self.credential;
        let token = request_token(
            &self.http_client,
            &self.token_url,
            &cred.client_id,
            &cred.client_secret,
            cred.auth_mode,
        )
        .await
        .map_err(|e| match e {
            Error::HttpStatus { status, .. } => Error::TokenRefresh {
                message: format!("token endpoint returned {status}"),
            },
            other => other,
        })?;

        self.credential.token = token;
        self.credential.issued_at_ms = issued_at_ms;
        Ok(())
    }

    /// Current credential
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Current bearer token
    pub fn token(&self) -> &str {
        &self.credential.token
    }

    /// Auth mode in use
    pub fn auth_mode(&self) -> AuthMode {
        self.credential.auth_mode
    }
}

impl std::fmt::Debug for CredentialBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBroker")
            .field("token_url", &self.token_url)
            .field("credential", &self.credential)
            .finish()
    }
}

fn validate_interval(interval: Duration) -> Result<i64> {
    if interval.is_zero() || interval >= MAX_REFRESH_INTERVAL {
        return Err(Error::invalid_value(
            "token_refresh_minutes",
            "must be greater than 0 and less than 60 minutes",
        ));
    }
    Ok(interval.as_millis() as i64)
}

/// Build the `Authorization` value for Basic mode
pub fn basic_header(client_id: &str, client_secret: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {encoded}")
}

/// Perform one client-credentials token request
async fn request_token(
    http_client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    mode: AuthMode,
) -> Result<String> {
    let req = match mode {
        AuthMode::Basic => http_client
            .post(token_url)
            .header(AUTHORIZATION, basic_header(client_id, client_secret))
            .form(&[("grant_type", "client_credentials")]),
        AuthMode::Post => http_client.post(token_url).form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "client_credentials"),
        ]),
    };

    let response = req.send().await.map_err(|e| {
        if e.is_timeout() {
            Error::connectivity(format!("token request timed out: {e}"))
        } else {
            Error::Http(e)
        }
    })?;

    if response.status() != StatusCode::OK {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        debug!("Token endpoint rejected {} auth: {} {}", mode, status, body);
        return Err(Error::http_status(status, body));
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .map_err(|e| Error::auth(format!("token response is missing access_token: {e}")))?;
    Ok(token_response.access_token)
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

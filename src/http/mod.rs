//! HTTP client module
//!
//! Provides the bearer-authenticated API client and the shared rate limiter.
//!
//! # Features
//!
//! - **Bounded timeouts**: every call carries a request timeout
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Error classification**: status, timeout and transport failures

mod client;
mod rate_limit;

pub use client::{ApiClient, ApiClientConfig, ApiClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

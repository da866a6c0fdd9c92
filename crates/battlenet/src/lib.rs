//! Outbound clients for the Battle.net profile API and the identity service.
//!
//! Provides the roster and per-character lookups, the process-wide
//! outbound [`rate_limit::RateLimiter`], and the shared HTTP client
//! construction used by both clients.

pub mod api;
pub mod config;
pub mod dto;
pub mod identity;
pub mod rate_limit;

use std::time::Duration;

/// Idle connections kept per upstream host.
const MAX_IDLE_PER_HOST: usize = 5;

/// How long an idle pooled connection is kept before being closed.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the [`reqwest::Client`] shared by every outbound call.
///
/// `timeout` bounds each request end to end.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
        .pool_idle_timeout(IDLE_TIMEOUT)
        .build()
}

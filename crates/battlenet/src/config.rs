//! Upstream endpoint and throttling configuration.

use std::time::Duration;

const DEFAULT_API_URL: &str = "https://eu.api.blizzard.com";
const DEFAULT_NAMESPACE: &str = "profile-eu";
const DEFAULT_LOCALE: &str = "en_GB";
const DEFAULT_IDENTITY_URL: &str = "http://auth_service:8080";
const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 10;

const DEFAULT_RATE_PER_SEC: u32 = 50;
const DEFAULT_BURST: u32 = 10;
const DEFAULT_MAX_WAIT_MS: u64 = 5_000;

/// Where and how to reach the Battle.net profile API and identity service.
#[derive(Debug, Clone)]
pub struct BattleNetConfig {
    /// Base URL of the profile API, without a trailing path.
    pub api_url: String,
    /// Value of the `namespace` query parameter (e.g. `profile-eu`).
    pub namespace: String,
    /// Value of the `locale` query parameter.
    pub locale: String,
    /// Base URL of the identity service.
    pub identity_url: String,
    /// End-to-end timeout applied to every outbound request.
    pub client_timeout: Duration,
}

impl BattleNetConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                    | Default                        |
    /// |----------------------------|--------------------------------|
    /// | `BATTLENET_API_URL`        | `https://eu.api.blizzard.com`  |
    /// | `BATTLENET_NAMESPACE`      | `profile-eu`                   |
    /// | `BATTLENET_LOCALE`         | `en_GB`                        |
    /// | `IDENTITY_SERVICE_URL`     | `http://auth_service:8080`     |
    /// | `HTTP_CLIENT_TIMEOUT_SECS` | `10`                           |
    ///
    /// # Panics
    ///
    /// Panics if `HTTP_CLIENT_TIMEOUT_SECS` is not a valid `u64`.
    pub fn from_env() -> Self {
        let client_timeout_secs: u64 = std::env::var("HTTP_CLIENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_CLIENT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("HTTP_CLIENT_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url: env_or("BATTLENET_API_URL", DEFAULT_API_URL),
            namespace: env_or("BATTLENET_NAMESPACE", DEFAULT_NAMESPACE),
            locale: env_or("BATTLENET_LOCALE", DEFAULT_LOCALE),
            identity_url: env_or("IDENTITY_SERVICE_URL", DEFAULT_IDENTITY_URL),
            client_timeout: Duration::from_secs(client_timeout_secs),
        }
    }
}

/// Token-bucket parameters for outbound Battle.net calls.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Sustained refill rate, tokens per second.
    pub per_second: u32,
    /// Bucket capacity.
    pub burst: u32,
    /// Longest a caller may wait for a token before giving up.
    pub max_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: DEFAULT_RATE_PER_SEC,
            burst: DEFAULT_BURST,
            max_wait: Duration::from_millis(DEFAULT_MAX_WAIT_MS),
        }
    }
}

impl RateLimitConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `RATE_LIMIT_PER_SEC`     | `50`    |
    /// | `RATE_LIMIT_BURST`       | `10`    |
    /// | `RATE_LIMIT_MAX_WAIT_MS` | `5000`  |
    ///
    /// # Panics
    ///
    /// Panics if any variable is set but not a valid number.
    pub fn from_env() -> Self {
        let per_second: u32 = std::env::var("RATE_LIMIT_PER_SEC")
            .unwrap_or_else(|_| DEFAULT_RATE_PER_SEC.to_string())
            .parse()
            .expect("RATE_LIMIT_PER_SEC must be a valid u32");

        let burst: u32 = std::env::var("RATE_LIMIT_BURST")
            .unwrap_or_else(|_| DEFAULT_BURST.to_string())
            .parse()
            .expect("RATE_LIMIT_BURST must be a valid u32");

        let max_wait_ms: u64 = std::env::var("RATE_LIMIT_MAX_WAIT_MS")
            .unwrap_or_else(|_| DEFAULT_MAX_WAIT_MS.to_string())
            .parse()
            .expect("RATE_LIMIT_MAX_WAIT_MS must be a valid u64");

        Self {
            per_second,
            burst,
            max_wait: Duration::from_millis(max_wait_ms),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

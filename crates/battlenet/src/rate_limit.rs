//! Process-wide throttle for outbound Battle.net calls.
//!
//! One [`RateLimiter`] is built at startup and shared by `Arc` with every
//! enrichment worker of every concurrent request, so all callers draw from
//! a single budget.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota};
use tokio_util::sync::CancellationToken;

use crate::config::RateLimitConfig;

/// Why a token could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    /// No token became available within the configured maximum wait.
    #[error("Rate limit exceeded: no token within {max_wait:?}")]
    Exceeded { max_wait: Duration },

    /// The caller's cancellation token fired while waiting.
    #[error("Cancelled while waiting for a rate-limit token")]
    Cancelled,
}

/// Token bucket with refill rate `per_second` and capacity `burst`.
pub struct RateLimiter {
    inner: DefaultDirectRateLimiter,
    max_wait: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(config.per_second).unwrap_or(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN));

        Self {
            inner: DefaultDirectRateLimiter::direct(quota),
            max_wait: config.max_wait,
        }
    }

    /// Wait until a token is available.
    ///
    /// Fails with [`AcquireError::Exceeded`] once the configured maximum
    /// wait elapses, or [`AcquireError::Cancelled`] as soon as `cancel`
    /// fires. Safe to call from any number of tasks at once.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), AcquireError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AcquireError::Cancelled),
            waited = tokio::time::timeout(self.max_wait, self.inner.until_ready()) => {
                waited.map_err(|_| AcquireError::Exceeded { max_wait: self.max_wait })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Retry policy applied by the executor.
//!
//! Only idempotent methods are replayed, and only after a transport failure
//! or one of the transient statuses below. A 401 is never retried; the
//! Session Guard owns it.

use std::time::Duration;

use crate::http::{HttpMethod, Outcome};

/// Statuses worth another attempt.
pub const RETRY_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Exponential backoff: delay for attempt `n` is `min(base * 2^(n-1), max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay)
    }

    /// Whether `outcome` of attempt number `attempt` (0-based) may be replayed.
    pub fn should_retry(&self, method: HttpMethod, attempt: u32, outcome: &Outcome) -> bool {
        if attempt >= self.max_retries || !method.is_idempotent() {
            return false;
        }
        match outcome {
            Ok(response) => RETRY_STATUSES.contains(&response.status),
            Err(_) => true,
        }
    }
}

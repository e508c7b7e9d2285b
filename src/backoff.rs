//! Inter-retry delay strategies for the send loop.

use crate::config::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Constant delay between attempts.
    #[default]
    Fixed,
    /// Delay doubles per attempt, capped at the configured maximum.
    Exponential,
    /// Exponential delay plus up to 25% random jitter, capped.
    Jittered,
}

/// Computes the sleep before a retry attempt.
#[derive(Debug, Clone)]
pub struct Backoff {
    strategy: BackoffStrategy,
    base_delay: Duration,
    max_delay: Duration,
}

impl Backoff {
    pub fn new(strategy: BackoffStrategy, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            strategy,
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms.max(base_delay_ms)),
        }
    }

    pub fn from_retry_config(retry: &RetryConfig) -> Self {
        Self::new(retry.backoff, retry.base_delay_ms, retry.max_delay_ms)
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.strategy {
            BackoffStrategy::Fixed => self.base_delay,
            BackoffStrategy::Exponential => self.exponential(attempt),
            BackoffStrategy::Jittered => {
                let delay = self.exponential(attempt);
                let jitter = delay.mul_f64(0.25 * rand::random::<f64>());
                (delay + jitter).min(self.max_delay)
            }
        }
    }

    fn exponential(&self, attempt: u32) -> Duration {
        let exp = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay
            .saturating_mul(exp)
            .min(self.max_delay)
    }
}

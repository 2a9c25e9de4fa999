use std::time::Duration;

use relay_config::RetryConfig;

/// Bounded retry with exponential backoff
///
/// The delay before attempt `n + 1` (zero-based `n`) is `base_delay * 2^n`.
/// There is no delay after the final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Three attempts, waiting 1s then 2s
    pub const DEFAULT: Self = Self {
        max_attempts: 3,
        base_delay: Duration::from_secs(1),
    };

    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured delay cannot be parsed
    pub fn from_config(config: &RetryConfig) -> anyhow::Result<Self> {
        Ok(Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay()?,
        })
    }

    /// Backoff after the zero-based `attempt` failed, or `None` if it was the last one
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        Some(self.base_delay.saturating_mul(2u32.saturating_pow(attempt)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

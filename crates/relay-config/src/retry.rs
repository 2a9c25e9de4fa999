use std::time::Duration;

use serde::Deserialize;

/// Retry loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt (e.g. "1s", "250ms"), doubled for each further attempt
    #[serde(default = "default_base_delay")]
    pub base_delay: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
        }
    }
}

impl RetryConfig {
    /// Parse the configured base delay
    ///
    /// # Errors
    ///
    /// Returns an error if the delay string is not a valid duration
    pub fn base_delay(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.base_delay)
            .map_err(|e| anyhow::anyhow!("invalid retry base_delay '{}': {e}", self.base_delay))
    }
}

const fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> String {
    "1s".to_owned()
}

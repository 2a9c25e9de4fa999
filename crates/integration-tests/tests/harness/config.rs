//! Programmatic configuration builder for integration tests

use std::time::Duration;

use relay_config::{LlmConfig, ProviderConfig};
use relay_llm::RetryPolicy;
use secrecy::SecretString;

/// API key the builder configures for every endpoint
pub const TEST_KEY: &str = "test-key";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: LlmConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default OpenRouter settings
    pub fn new() -> Self {
        Self {
            config: LlmConfig::default(),
        }
    }

    /// Point the OpenRouter endpoint at a mock server
    pub fn with_openrouter(mut self, base_url: &str) -> Self {
        self.config.openrouter = provider(base_url);
        self
    }

    /// Configure a custom endpoint at a mock server
    pub fn with_custom(mut self, base_url: &str) -> Self {
        self.config.custom = Some(provider(base_url));
        self
    }

    /// Set the default model
    pub fn with_default_model(mut self, model: &str) -> Self {
        model.clone_into(&mut self.config.default_model);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> LlmConfig {
        self.config
    }
}

/// Retry policy with the production attempt count and millisecond delays
pub const fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
    }
}

fn provider(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        api_key: Some(SecretString::from(TEST_KEY)),
        base_url: base_url.parse().expect("valid URL"),
    }
}

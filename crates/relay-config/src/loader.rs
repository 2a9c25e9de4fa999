use std::path::Path;

use secrecy::SecretString;
use url::Url;

use crate::{Config, LlmConfig, ProviderConfig};

/// OpenRouter bearer credential
pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";
/// Model used by helpers that do not take one explicitly
pub const OPENROUTER_DEFAULT_MODEL_VAR: &str = "OPENROUTER_DEFAULT_MODEL";
/// Bearer credential for the custom endpoint
pub const CUSTOM_API_KEY_VAR: &str = "CUSTOM_LLM_API_KEY";
/// Base URL of the custom endpoint; the endpoint is only configured when this is set
pub const CUSTOM_BASE_URL_VAR: &str = "CUSTOM_LLM_BASE_URL";

impl Config {
    /// Build configuration from process environment variables
    ///
    /// Everything except the endpoints keeps its default value.
    ///
    /// # Errors
    ///
    /// Returns an error if the custom endpoint URL is not a valid URL
    pub fn from_env() -> anyhow::Result<Self> {
        let openrouter = ProviderConfig {
            api_key: non_empty_var(OPENROUTER_API_KEY_VAR).map(SecretString::from),
            ..ProviderConfig::default()
        };

        let custom = match non_empty_var(CUSTOM_BASE_URL_VAR) {
            Some(raw) => {
                let base_url = Url::parse(&raw)
                    .map_err(|e| anyhow::anyhow!("invalid {CUSTOM_BASE_URL_VAR} '{raw}': {e}"))?;
                Some(ProviderConfig {
                    api_key: non_empty_var(CUSTOM_API_KEY_VAR).map(SecretString::from),
                    base_url,
                })
            }
            None => None,
        };

        let mut llm = LlmConfig {
            openrouter,
            custom,
            ..LlmConfig::default()
        };
        if let Some(model) = non_empty_var(OPENROUTER_DEFAULT_MODEL_VAR) {
            llm.default_model = model;
        }

        if llm.openrouter.api_key.is_none() {
            tracing::warn!("{OPENROUTER_API_KEY_VAR} is not set, requests to OpenRouter will be unauthenticated");
        }

        let config = Self {
            llm,
            ..Self::default()
        };
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the retry settings or model name are invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        self.retry.base_delay()?;

        if self.llm.default_model.trim().is_empty() {
            anyhow::bail!("llm.default_model must not be empty");
        }

        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

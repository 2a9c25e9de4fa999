use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Base URL of the OpenRouter API
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

/// Upstream endpoint configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// The default provider (OpenRouter)
    #[serde(default)]
    pub openrouter: ProviderConfig,
    /// Optional custom or self-hosted OpenAI-compatible endpoint
    #[serde(default)]
    pub custom: Option<ProviderConfig>,
    /// Model identifier used by helpers that do not take one explicitly
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openrouter: ProviderConfig::default(),
            custom: None,
            default_model: default_model(),
        }
    }
}

/// Credentials and location of one OpenAI-compatible endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Bearer credential
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL, `/chat/completions` is appended to it
    #[serde(default = "default_base_url")]
    pub base_url: Url,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

fn default_base_url() -> Url {
    Url::parse(OPENROUTER_BASE_URL).expect("valid default URL")
}

//! Driver construction from configuration

use std::sync::Arc;

use relay_config::LlmConfig;

use crate::backend::openai::OpenAiCompatibleBackend;
use crate::driver::RequestDriver;
use crate::error::LlmError;
use crate::schema::AgentAction;
use crate::types::Message;

/// Backend name used in logs for the OpenRouter endpoint
pub const OPENROUTER_BACKEND: &str = "openrouter";

/// Backend name used in logs for the custom endpoint
pub const CUSTOM_BACKEND: &str = "custom";

/// Driver for `model` on OpenRouter
///
/// With `json_mode` the driver requests [`AgentAction`]-shaped output.
pub fn create_driver(config: &LlmConfig, model: impl Into<String>, json_mode: bool) -> RequestDriver {
    let backend = Arc::new(OpenAiCompatibleBackend::new(OPENROUTER_BACKEND, &config.openrouter));
    with_json_mode(RequestDriver::new(backend, model), json_mode)
}

/// Driver for `model` on the configured custom endpoint
///
/// # Errors
///
/// Returns `LlmError::InvalidRequest` if no custom endpoint is configured
pub fn create_custom_driver(
    config: &LlmConfig,
    model: impl Into<String>,
    json_mode: bool,
) -> Result<RequestDriver, LlmError> {
    let custom = config
        .custom
        .as_ref()
        .ok_or_else(|| LlmError::InvalidRequest("no custom endpoint configured".to_owned()))?;

    let backend = Arc::new(OpenAiCompatibleBackend::new(CUSTOM_BACKEND, custom));
    Ok(with_json_mode(RequestDriver::new(backend, model), json_mode))
}

/// One-off plain request on the default model
///
/// Returns the response text, or an empty string when the request failed.
pub async fn semantic_match_request(config: &LlmConfig, messages: &[Message]) -> String {
    let driver = create_driver(config, config.default_model.clone(), false);
    let envelope = driver.request(messages, None, None).await;

    if let Some(error) = &envelope.error {
        tracing::warn!(model = %config.default_model, error = %error, "semantic match request failed");
        return String::new();
    }

    envelope.content.as_text().unwrap_or_default().to_owned()
}

fn with_json_mode(driver: RequestDriver, json_mode: bool) -> RequestDriver {
    if json_mode {
        driver.with_schema(AgentAction::schema())
    } else {
        driver
    }
}

#[cfg(test)]
mod tests {
    use relay_config::ProviderConfig;
    use url::Url;

    use super::*;
    use crate::strategy::ModeStrategy;

    #[test]
    fn openrouter_driver() {
        let driver = create_driver(&LlmConfig::default(), "openai/gpt-4o", true);
        assert_eq!(driver.model(), "openai/gpt-4o");
        assert!(driver.json_mode());
        assert_eq!(driver.strategy(), ModeStrategy::Unset);

        let plain = create_driver(&LlmConfig::default(), "openai/gpt-4o", false);
        assert!(!plain.json_mode());
    }

    #[test]
    fn custom_driver_requires_endpoint() {
        let err = create_custom_driver(&LlmConfig::default(), "local/qwen", false).unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }

    #[test]
    fn custom_driver_uses_configured_endpoint() {
        let config = LlmConfig {
            custom: Some(ProviderConfig {
                api_key: None,
                base_url: Url::parse("http://localhost:8000/v1").unwrap(),
            }),
            ..LlmConfig::default()
        };
        let driver = create_custom_driver(&config, "local/qwen", true).unwrap();
        assert_eq!(driver.model(), "local/qwen");
        assert!(driver.json_mode());
        assert!(format!("{driver:?}").contains("custom"));
    }
}

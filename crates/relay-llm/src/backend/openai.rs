//! OpenAI-compatible HTTP backend (OpenRouter or a self-hosted server)

use async_trait::async_trait;
use relay_config::ProviderConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::ChatBackend;
use crate::error::LlmError;
use crate::protocol::openai::{ChatCompletionRequest, ChatCompletionResponse, ErrorResponse};

/// OpenAI-compatible chat completion backend
pub struct OpenAiCompatibleBackend {
    name: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl OpenAiCompatibleBackend {
    /// Create from provider configuration
    ///
    /// No request timeout is set; callers that need one pass their own
    /// client to [`Self::with_client`].
    pub fn new(name: impl Into<String>, config: &ProviderConfig) -> Self {
        Self::with_client(name, config, Client::new())
    }

    /// Create with a preconfigured HTTP client
    pub fn with_client(name: impl Into<String>, config: &ProviderConfig, client: Client) -> Self {
        Self {
            name: name.into(),
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

impl std::fmt::Debug for OpenAiCompatibleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleBackend")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatibleBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse, LlmError> {
        let mut builder = self.client.post(self.completions_url()).json(request);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(backend = %self.name, error = %e, "request did not reach the endpoint");
            LlmError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(backend = %self.name, status = %status, "endpoint returned error");
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let response: ChatCompletionResponse = response.json().await.map_err(|e| LlmError::Parse(e.to_string()))?;

        if response.choices.is_empty() {
            return Err(LlmError::Parse("response contained no choices".to_owned()));
        }

        Ok(response)
    }
}

/// Pull the message out of an OpenAI-style error body, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body).map_or_else(|_| body.to_owned(), |parsed| parsed.error.message)
}

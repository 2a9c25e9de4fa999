//! Request driver: retry loop, JSON-mode degradation and usage reporting

use std::fmt;
use std::sync::Arc;

use crate::backend::ChatBackend;
use crate::error::LlmError;
use crate::protocol::openai::{ChatCompletionRequest, ChatCompletionResponse, ResponseFormat, UsageOptions};
use crate::retry::RetryPolicy;
use crate::schema::OutputSchema;
use crate::strategy::{ModeStrategy, StrategyCell, with_json_instruction};
use crate::types::{Message, ResponseContent, ResponseEnvelope};
use crate::usage::extract_usage;

/// `max_tokens` used when the caller passes `None`
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// `temperature` used when the caller passes `None`
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Drives chat-completion requests for one model
///
/// With a schema attached the driver asks for JSON output, probing the
/// strictest `response_format` the endpoint accepts and remembering the
/// result for its lifetime. The remembered tier is not keyed by model, so
/// use one driver per model.
///
/// Any 400, 404 or 422 answer to a JSON-tier request degrades the tier,
/// whatever its cause. A 400 for an oversized prompt therefore also moves
/// the driver down, and it never moves back up.
pub struct RequestDriver {
    backend: Arc<dyn ChatBackend>,
    model: String,
    schema: Option<Arc<dyn OutputSchema>>,
    strategy: StrategyCell,
    retry: RetryPolicy,
}

impl RequestDriver {
    /// Plain-text driver with the default retry policy
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            schema: None,
            strategy: StrategyCell::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Request JSON output shaped by `schema`
    #[must_use]
    pub fn with_schema(mut self, schema: Arc<dyn OutputSchema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Replace the retry policy
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Model identifier sent upstream
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether structured output is requested
    pub const fn json_mode(&self) -> bool {
        self.schema.is_some()
    }

    /// Output-formatting tier resolved so far
    pub fn strategy(&self) -> ModeStrategy {
        self.strategy.get()
    }

    /// Obtain a completion, retrying transient failures
    ///
    /// Never fails: when every attempt errors, the envelope carries the
    /// last error message, empty content and zero usage.
    pub async fn request(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
        temperature: Option<f64>,
    ) -> ResponseEnvelope {
        let mut attempt = 0;

        loop {
            match self.attempt(messages, max_tokens, temperature).await {
                Ok(envelope) => return envelope,
                Err(e) => {
                    tracing::error!(
                        model = %self.model,
                        backend = self.backend.name(),
                        attempt = attempt + 1,
                        max_attempts = self.retry.max_attempts,
                        error = %e,
                        "request failed"
                    );

                    let Some(delay) = self.retry.backoff(attempt) else {
                        return ResponseEnvelope::failure(e.to_string());
                    };

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Single attempt: call the endpoint and shape the result
    async fn attempt(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
        temperature: Option<f64>,
    ) -> Result<ResponseEnvelope, LlmError> {
        let response = self.chat(messages, max_tokens, temperature).await?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::Parse("response contained no choices".to_owned()))?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!(
                model = %self.model,
                "response truncated at max_tokens, JSON output may be incomplete"
            );
        }

        let raw = choice.message.content.clone().unwrap_or_default();
        let usage = extract_usage(&response, &self.model);

        Ok(ResponseEnvelope::success(self.shape(raw), usage))
    }

    /// Parse against the schema, keeping the raw text when it does not fit
    fn shape(&self, raw: String) -> ResponseContent {
        let Some(schema) = &self.schema else {
            return ResponseContent::Text(raw);
        };

        match schema.parse(&raw) {
            Ok(value) => ResponseContent::Structured(value),
            Err(e) => {
                tracing::warn!(model = %self.model, error = %e, "returning raw output");
                ResponseContent::Text(raw)
            }
        }
    }

    /// Issue one completion call, degrading `response_format` as needed
    ///
    /// Capability rejections are absorbed here; any other error is returned
    /// to the caller without changing the resolved tier.
    ///
    /// # Errors
    ///
    /// Returns the backend error of the final call made
    pub async fn chat(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
        temperature: Option<f64>,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let max_tokens = max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        let temperature = temperature.unwrap_or(DEFAULT_TEMPERATURE);

        let Some(schema) = &self.schema else {
            return self.send(messages.to_vec(), max_tokens, temperature, None).await;
        };

        let mut tier = self.strategy.get().effective();

        while tier.requests_json() {
            tracing::debug!(model = %self.model, strategy = %tier, "attempting JSON mode");

            let prepared = with_json_instruction(messages).into_owned();
            let format = tier.response_format(schema.as_ref());

            match self.send(prepared, max_tokens, temperature, format).await {
                Ok(response) => {
                    if self.strategy.advance(tier) == tier {
                        tracing::info!(model = %self.model, strategy = %tier, "JSON mode resolved");
                    }
                    return Ok(response);
                }
                Err(e) if e.is_capability_rejection() => {
                    tracing::warn!(model = %self.model, strategy = %tier, error = %e, "response format not supported");
                    tier = self.strategy.advance(tier.degrade());
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(
            model = %self.model,
            "JSON mode disabled, neither json_schema nor json_object supported; relying on prompt instructions"
        );

        self.send(messages.to_vec(), max_tokens, temperature, None).await
    }

    async fn send(
        &self,
        messages: Vec<Message>,
        max_tokens: u32,
        temperature: f64,
        response_format: Option<ResponseFormat>,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
            response_format,
            usage: UsageOptions::default(),
        };

        self.backend.complete(&request).await
    }
}

impl fmt::Debug for RequestDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDriver")
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .field("schema", &self.schema.as_ref().map(|s| s.name().to_owned()))
            .field("strategy", &self.strategy.get())
            .field("retry", &self.retry)
            .finish()
    }
}

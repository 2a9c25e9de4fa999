//! Usage extraction and local token estimation

use tiktoken_rs::CoreBPE;

use crate::protocol::openai::ChatCompletionResponse;
use crate::types::{Message, UsageRecord};

/// Read token counts and cost from a response
///
/// Missing sub-fields default to zero. A response without any usage block
/// yields [`UsageRecord::ZERO`] and a warning.
pub fn extract_usage(response: &ChatCompletionResponse, model: &str) -> UsageRecord {
    let Some(usage) = &response.usage else {
        tracing::warn!(model, "no usage data in response");
        return UsageRecord::ZERO;
    };

    UsageRecord {
        prompt_tokens: usage.prompt_tokens.unwrap_or(0),
        completion_tokens: usage.completion_tokens.unwrap_or(0),
        total_tokens: usage.total_tokens.unwrap_or(0),
        cost: usage.cost.unwrap_or(0.0),
    }
}

/// Estimate prompt tokens for a conversation without calling the endpoint
///
/// Only text is counted; image parts are ignored.
pub fn estimate_tokens(messages: &[Message], model: &str) -> usize {
    let bpe = encoder_for(model);
    messages
        .iter()
        .map(|m| count(bpe.as_ref(), &m.content.as_text()))
        .sum()
}

/// Estimate tokens for a single string
pub fn estimate_text_tokens(text: &str, model: &str) -> usize {
    count(encoder_for(model).as_ref(), text)
}

/// Tokenizer for an OpenRouter model id, falling back to `cl100k_base`
fn encoder_for(model: &str) -> Option<CoreBPE> {
    let bare = model.rsplit_once('/').map_or(model, |(_, name)| name);
    tiktoken_rs::get_bpe_from_model(bare)
        .or_else(|_| tiktoken_rs::cl100k_base())
        .inspect_err(|e| tracing::warn!(model, error = %e, "no tokenizer available, estimating from length"))
        .ok()
}

fn count(bpe: Option<&CoreBPE>, text: &str) -> usize {
    bpe.map_or_else(|| text.len() / 4, |bpe| bpe.encode_with_special_tokens(text).len())
}

//! JSON-mode degradation state machine
//!
//! A driver starts out not knowing which output-formatting guarantee the
//! model supports. Each rejected probe moves it one tier down:
//!
//! ```text
//! Unset -> StructuredSchema -> JsonObject -> Disabled
//! ```
//!
//! The state never moves back up. Concurrent requests on one driver may
//! repeat a failed probe, but since every transition is a `fetch_max` on
//! the same atomic they always converge on the lowest tier reached.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::protocol::openai::{JsonSchemaFormat, ResponseFormat};
use crate::schema::OutputSchema;
use crate::types::{Message, Role};

/// Synthetic instruction prepended when no system message mentions JSON
pub const JSON_INSTRUCTION: &str = "You are a helpful assistant designed to output JSON.";

/// Output-formatting tier the driver uses for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ModeStrategy {
    /// No request made yet; the first one probes `StructuredSchema`
    Unset = 0,
    /// Schema-constrained output (`json_schema`)
    StructuredSchema = 1,
    /// Generic JSON output (`json_object`)
    JsonObject = 2,
    /// Plain request, the prompt is trusted to ask for JSON
    Disabled = 3,
}

impl ModeStrategy {
    /// Tier to use for the next attempt
    ///
    /// `Unset` probes the strictest tier.
    pub const fn effective(self) -> Self {
        match self {
            Self::Unset => Self::StructuredSchema,
            other => other,
        }
    }

    /// Tier to fall back to after the endpoint rejected this one
    pub const fn degrade(self) -> Self {
        match self {
            Self::Unset | Self::StructuredSchema => Self::JsonObject,
            Self::JsonObject | Self::Disabled => Self::Disabled,
        }
    }

    /// Whether requests in this tier carry a `response_format`
    pub const fn requests_json(self) -> bool {
        matches!(self.effective(), Self::StructuredSchema | Self::JsonObject)
    }

    /// `response_format` to send in this tier
    pub fn response_format(self, schema: &dyn OutputSchema) -> Option<ResponseFormat> {
        match self.effective() {
            Self::StructuredSchema => Some(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: schema.name().to_owned(),
                    strict: true,
                    schema: schema.json_schema(),
                },
            }),
            Self::JsonObject => Some(ResponseFormat::JsonObject),
            Self::Unset | Self::Disabled => None,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Unset,
            1 => Self::StructuredSchema,
            2 => Self::JsonObject,
            _ => Self::Disabled,
        }
    }
}

impl std::fmt::Display for ModeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unset => "unset",
            Self::StructuredSchema => "json_schema",
            Self::JsonObject => "json_object",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

/// Per-driver strategy slot that only ever moves forward
#[derive(Debug)]
pub struct StrategyCell(AtomicU8);

impl StrategyCell {
    /// Fresh cell in the `Unset` state
    pub const fn new() -> Self {
        Self(AtomicU8::new(ModeStrategy::Unset as u8))
    }

    /// Current state
    pub fn get(&self) -> ModeStrategy {
        ModeStrategy::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move to `next` unless the cell is already at or past it
    ///
    /// Returns the state after the update.
    pub fn advance(&self, next: ModeStrategy) -> ModeStrategy {
        let previous = self.0.fetch_max(next as u8, Ordering::AcqRel);
        ModeStrategy::from_u8(previous).max(next)
    }
}

impl Default for StrategyCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Make sure some system message asks for JSON output
///
/// Returns the input unchanged when a system message already mentions
/// "json" in any case, otherwise a copy with [`JSON_INSTRUCTION`] prepended.
pub fn with_json_instruction(messages: &[Message]) -> Cow<'_, [Message]> {
    let has_instruction = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .any(|m| m.content.as_text().to_lowercase().contains("json"));

    if has_instruction {
        return Cow::Borrowed(messages);
    }

    let mut prepared = Vec::with_capacity(messages.len() + 1);
    prepared.push(Message::system(JSON_INSTRUCTION));
    prepared.extend_from_slice(messages);
    Cow::Owned(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AgentAction;
    use crate::types::{Content, ContentPart};

    #[test]
    fn degradation_order() {
        assert_eq!(ModeStrategy::Unset.degrade(), ModeStrategy::JsonObject);
        assert_eq!(ModeStrategy::StructuredSchema.degrade(), ModeStrategy::JsonObject);
        assert_eq!(ModeStrategy::JsonObject.degrade(), ModeStrategy::Disabled);
        assert_eq!(ModeStrategy::Disabled.degrade(), ModeStrategy::Disabled);
    }

    #[test]
    fn unset_probes_structured_schema() {
        assert_eq!(ModeStrategy::Unset.effective(), ModeStrategy::StructuredSchema);
        assert!(ModeStrategy::Unset.requests_json());
        assert!(!ModeStrategy::Disabled.requests_json());
    }

    #[test]
    fn response_format_per_tier() {
        let schema = AgentAction::schema();
        match ModeStrategy::Unset.response_format(schema.as_ref()) {
            Some(ResponseFormat::JsonSchema { json_schema }) => {
                assert_eq!(json_schema.name, "agent_action");
                assert!(json_schema.strict);
                assert_eq!(json_schema.schema["type"], "object");
            }
            other => panic!("expected json_schema, got {other:?}"),
        }
        assert_eq!(
            ModeStrategy::JsonObject.response_format(schema.as_ref()),
            Some(ResponseFormat::JsonObject)
        );
        assert_eq!(ModeStrategy::Disabled.response_format(schema.as_ref()), None);
    }

    #[test]
    fn cell_never_moves_backwards() {
        let cell = StrategyCell::new();
        assert_eq!(cell.get(), ModeStrategy::Unset);

        assert_eq!(cell.advance(ModeStrategy::JsonObject), ModeStrategy::JsonObject);
        // A slower concurrent probe reporting schema success must not undo the degradation
        assert_eq!(cell.advance(ModeStrategy::StructuredSchema), ModeStrategy::JsonObject);
        assert_eq!(cell.get(), ModeStrategy::JsonObject);

        assert_eq!(cell.advance(ModeStrategy::Disabled), ModeStrategy::Disabled);
        assert_eq!(cell.advance(ModeStrategy::Unset), ModeStrategy::Disabled);
    }

    #[test]
    fn instruction_added_when_no_system_message() {
        let messages = vec![Message::user("find the cheapest flight")];
        let prepared = with_json_instruction(&messages);
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0], Message::system(JSON_INSTRUCTION));
        assert_eq!(prepared[1], messages[0]);
    }

    #[test]
    fn instruction_added_when_system_message_lacks_json() {
        let messages = vec![Message::system("You are a web agent."), Message::user("go")];
        let prepared = with_json_instruction(&messages);
        assert_eq!(prepared.len(), 3);
        assert_eq!(prepared[0].content.as_text(), JSON_INSTRUCTION);
    }

    #[test]
    fn existing_json_instruction_is_respected_in_any_case() {
        for text in ["Reply in JSON.", "reply with json only", "Return a Json object"] {
            let messages = vec![Message::system(text), Message::user("go")];
            let prepared = with_json_instruction(&messages);
            assert!(matches!(prepared, Cow::Borrowed(_)));
            assert_eq!(prepared.len(), 2);
        }
    }

    #[test]
    fn json_mentioned_only_by_user_does_not_count() {
        let messages = vec![Message::user("answer in JSON")];
        assert_eq!(with_json_instruction(&messages).len(), 2);
    }

    #[test]
    fn system_parts_are_scanned() {
        let messages = vec![Message {
            role: Role::System,
            content: Content::Parts(vec![ContentPart::Text {
                text: "Output JSON".to_owned(),
            }]),
        }];
        assert!(matches!(with_json_instruction(&messages), Cow::Borrowed(_)));
    }
}

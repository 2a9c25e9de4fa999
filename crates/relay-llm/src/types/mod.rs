//! Caller-facing types: messages in, envelopes out

mod envelope;
mod message;
mod usage;

pub use envelope::{ResponseContent, ResponseEnvelope};
pub use message::{Content, ContentPart, ImageUrl, Message, Role};
pub use usage::UsageRecord;

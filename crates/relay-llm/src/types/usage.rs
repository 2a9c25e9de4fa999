use serde::{Deserialize, Serialize};

/// Token counts and monetary cost reported for one completion call
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u64,
    /// Tokens generated in the completion
    pub completion_tokens: u64,
    /// Total tokens as reported by the endpoint
    pub total_tokens: u64,
    /// Cost in credits (USD on OpenRouter)
    pub cost: f64,
}

impl UsageRecord {
    /// All-zero record, used when a call fails or reports nothing
    pub const ZERO: Self = Self {
        prompt_tokens: 0,
        completion_tokens: 0,
        total_tokens: 0,
        cost: 0.0,
    };

    /// Whether every field is zero
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl std::ops::AddAssign for UsageRecord {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens += rhs.prompt_tokens;
        self.completion_tokens += rhs.completion_tokens;
        self.total_tokens += rhs.total_tokens;
        self.cost += rhs.cost;
    }
}

use std::collections::HashMap;

use indexmap::IndexMap;
use relay_llm::UsageRecord;
use serde::{Deserialize, Serialize};

/// Usage of one agent step, split by the model that produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepUsage {
    /// Model used for planning calls
    pub planning_model: String,
    /// Model used for reward calls
    pub reward_model: String,
    /// Accumulated usage of the planning calls
    pub planning: UsageRecord,
    /// Accumulated usage of the reward calls
    pub reward: UsageRecord,
}

impl StepUsage {
    /// Empty step for the given models
    pub fn new(planning_model: impl Into<String>, reward_model: impl Into<String>) -> Self {
        Self {
            planning_model: planning_model.into(),
            reward_model: reward_model.into(),
            planning: UsageRecord::ZERO,
            reward: UsageRecord::ZERO,
        }
    }

    /// Add the usage of one planning call
    pub fn add_planning(&mut self, usage: &UsageRecord) {
        self.planning += *usage;
    }

    /// Add the usage of one reward call
    pub fn add_reward(&mut self, usage: &UsageRecord) {
        self.reward += *usage;
    }
}

/// Price per token for one model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    /// Price per prompt token
    pub input: f64,
    /// Price per completion token
    pub output: f64,
}

impl ModelPrice {
    /// Cost of the given usage at this price
    #[allow(clippy::cast_precision_loss)]
    pub fn cost(&self, usage: &UsageRecord) -> f64 {
        usage.prompt_tokens as f64 * self.input + usage.completion_tokens as f64 * self.output
    }
}

/// Static per-model prices, used when the endpoint reports no cost
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingTable(HashMap<String, ModelPrice>);

impl PricingTable {
    /// Add or replace the price of `model`
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, price: ModelPrice) -> Self {
        self.0.insert(model.into(), price);
        self
    }

    /// Price of `model`, if known
    pub fn price(&self, model: &str) -> Option<&ModelPrice> {
        self.0.get(model)
    }
}

/// Running token and cost totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageTotals {
    pub planning_input_tokens: u64,
    pub planning_output_tokens: u64,
    pub reward_input_tokens: u64,
    pub reward_output_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub planning_cost: f64,
    pub reward_cost: f64,
    pub total_cost: f64,
}

impl UsageTotals {
    /// Add one step with its already-resolved costs
    pub fn add(&mut self, step: &StepUsage, planning_cost: f64, reward_cost: f64) {
        let input = step.planning.prompt_tokens + step.reward.prompt_tokens;
        let output = step.planning.completion_tokens + step.reward.completion_tokens;

        self.planning_input_tokens += step.planning.prompt_tokens;
        self.planning_output_tokens += step.planning.completion_tokens;
        self.reward_input_tokens += step.reward.prompt_tokens;
        self.reward_output_tokens += step.reward.completion_tokens;
        self.input_tokens += input;
        self.output_tokens += output;
        self.total_tokens += input + output;
        self.planning_cost += planning_cost;
        self.reward_cost += reward_cost;
        self.total_cost += planning_cost + reward_cost;
    }
}

/// One recorded step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub task_name: String,
    pub step_tokens: StepUsage,
}

/// On-disk ledger contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerDocument {
    /// Every recorded step, oldest first
    pub calls: Vec<CallRecord>,
    /// Totals over all tasks
    pub totals: UsageTotals,
    /// Totals per task, in first-seen order
    pub tasks: IndexMap<String, UsageTotals>,
}

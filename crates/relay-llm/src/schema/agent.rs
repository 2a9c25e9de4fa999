//! Response shapes used by the web agent's planning and reward prompts

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{OutputSchema, TypedSchema};

/// Planning/action step chosen by the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AgentAction {
    /// The reasoning about what action is needed to complete the task
    pub thought: String,
    /// The action to perform (goto, fill_form, google_search, click, select_option, go_back, cache_data, get_final_answer)
    pub action: String,
    /// The input for the action (URL for goto, query for google_search, text for fill_form)
    pub action_input: String,
    /// Element ID from the accessibility tree, null for actions like goto
    #[serde(default)]
    pub element_id: Option<ElementId>,
    /// What website this is and which action was chosen
    pub description: String,
}

impl AgentAction {
    /// Schema name sent upstream
    pub const SCHEMA_NAME: &'static str = "agent_action";

    /// Shareable schema handle for the driver
    pub fn schema() -> Arc<dyn OutputSchema> {
        Arc::new(TypedSchema::<Self>::new(Self::SCHEMA_NAME))
    }
}

/// Accessibility-tree element reference; models return either form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ElementId {
    /// Numeric ID
    Index(i64),
    /// ID given as a string
    Text(String),
}

/// Evaluation of task progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Reward {
    /// Task status: "doing", "finished" or "loop" (global reward only)
    #[serde(default)]
    pub status: Option<String>,
    /// Score from [1, 3, 7, 9, 10]
    pub score: String,
    /// Evidence for the score (global reward only)
    #[serde(default)]
    pub reason: Option<String>,
    /// Current completion status and future plan
    pub description: String,
}

impl Reward {
    /// Schema name sent upstream
    pub const SCHEMA_NAME: &'static str = "reward";

    /// Shareable schema handle for the driver
    pub fn schema() -> Arc<dyn OutputSchema> {
        Arc::new(TypedSchema::<Self>::new(Self::SCHEMA_NAME))
    }
}

#![allow(clippy::must_use_candidate)]

//! Configuration for the relay request driver
//!
//! Values come either from process environment variables
//! ([`Config::from_env`]) or from a TOML file with `{{ env.VAR }}`
//! placeholders ([`Config::load`]).

mod env;
pub mod ledger;
pub mod llm;
mod loader;
pub mod retry;
pub mod telemetry;

use serde::Deserialize;

pub use ledger::*;
pub use llm::*;
pub use retry::*;
pub use telemetry::*;

/// Top-level relay configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Upstream chat-completion endpoints
    #[serde(default)]
    pub llm: LlmConfig,
    /// Retry loop settings
    #[serde(default)]
    pub retry: RetryConfig,
    /// Log output settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Token/cost ledger file
    #[serde(default)]
    pub ledger: Option<LedgerConfig>,
}

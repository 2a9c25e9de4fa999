//! Cumulative token and cost ledger
//!
//! Each agent step reports the usage of its planning and reward calls;
//! the ledger appends it to a JSON file and keeps running totals overall
//! and per task.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod ledger;
pub mod types;

pub use error::LedgerError;
pub use ledger::UsageLedger;
pub use types::{CallRecord, LedgerDocument, ModelPrice, PricingTable, StepUsage, UsageTotals};

//! JSON file ledger with atomic rewrites

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use relay_config::LedgerConfig;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::LedgerError;
use crate::types::{CallRecord, LedgerDocument, PricingTable, StepUsage, UsageTotals};

/// Ledger backed by a single JSON file
///
/// Every [`record`](Self::record) reloads the file, appends the step and
/// replaces the file through a temporary sibling, so readers never see a
/// partially written document. Writes from one process are serialized.
#[derive(Debug)]
pub struct UsageLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl UsageLedger {
    /// Ledger at `path`; the file is created on first record
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Ledger at the configured path
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::open(config.path.clone())
    }

    /// Ledger file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents, or an empty document if the file does not exist
    pub fn load(&self) -> Result<LedgerDocument, LedgerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LedgerDocument::default()),
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_str(&raw).map_err(|source| LedgerError::Malformed {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Append one step and update the running totals
    ///
    /// Costs reported by the endpoint win; `pricing` is consulted only when
    /// both reported costs are zero. Returns the updated overall totals.
    pub fn record(
        &self,
        task_name: &str,
        step: &StepUsage,
        pricing: Option<&PricingTable>,
    ) -> Result<UsageTotals, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut document = self.load()?;
        let (planning_cost, reward_cost) = step_costs(step, pricing);

        document.calls.push(CallRecord {
            task_name: task_name.to_owned(),
            step_tokens: step.clone(),
        });
        document.totals.add(step, planning_cost, reward_cost);
        document
            .tasks
            .entry(task_name.to_owned())
            .or_default()
            .add(step, planning_cost, reward_cost);

        self.write(&document)?;

        tracing::debug!(
            task = task_name,
            path = %self.path.display(),
            total_tokens = document.totals.total_tokens,
            total_cost = document.totals.total_cost,
            "usage recorded"
        );

        Ok(document.totals)
    }

    fn write(&self, document: &LedgerDocument) -> Result<(), LedgerError> {
        let mut body = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(b"    "));
        document.serialize(&mut serializer)?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        file.write_all(&body).map_err(|e| self.io_error(e))?;
        file.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Planning and reward cost of one step
fn step_costs(step: &StepUsage, pricing: Option<&PricingTable>) -> (f64, f64) {
    if step.planning.cost > 0.0 || step.reward.cost > 0.0 {
        return (step.planning.cost, step.reward.cost);
    }

    let Some(pricing) = pricing else {
        return (0.0, 0.0);
    };

    let planning = pricing
        .price(&step.planning_model)
        .map_or(0.0, |p| p.cost(&step.planning));
    let reward = pricing.price(&step.reward_model).map_or(0.0, |p| p.cost(&step.reward));

    (planning, reward)
}

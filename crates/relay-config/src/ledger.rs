use std::path::PathBuf;

use serde::Deserialize;

/// Location of the cumulative token/cost ledger
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// JSON file the ledger reads and rewrites
    pub path: PathBuf,
}

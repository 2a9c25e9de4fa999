/// Errors returned by the usage ledger
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Reading or writing the ledger file failed
    #[error("ledger I/O error on {path}: {source}")]
    Io {
        /// Ledger file path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// The ledger file is not a valid ledger document
    #[error("ledger file {path} is malformed: {source}")]
    Malformed {
        /// Ledger file path
        path: String,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Serializing the ledger document failed
    #[error("failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error taxonomy for template retrieval
///
/// Every failure the retrieval core can surface to its caller. Collaborators outside
/// the core (generation, deploy, ingestion) report through `anyhow` instead.

use std::path::PathBuf;
use thiserror::Error;

/// Retrieval error types
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// A required credential or endpoint is absent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A persisted catalog is missing or unparsable
    #[error("Failed to load {}: {reason}", path.display())]
    StoreLoad { path: PathBuf, reason: String },

    /// Query text rejected before any external call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The embedding endpoint failed or returned no vector
    #[error("Embedding error: {0}")]
    Embedding(String),
}

impl RetrievalError {
    pub(crate) fn store_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StoreLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for retrieval operations
pub type Result<T> = std::result::Result<T, RetrievalError>;

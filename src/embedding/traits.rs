/// EmbeddingProvider trait definition

use crate::error::{Result, RetrievalError};
use async_trait::async_trait;

/// Abstract interface for turning text into a vector
///
/// Shared across requests as `Arc<dyn EmbeddingProvider>`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text
    ///
    /// Blank input fails with `InvalidInput` before any external call. Transport
    /// failures, error statuses and empty responses fail with `Embedding`. There is
    /// no retry.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Fails with `Configuration` when the provider cannot make calls at all
    ///
    /// Called by the retrieval service before it touches the store or the network.
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }

    /// Model name, recorded in logs
    fn model_name(&self) -> &str;
}

/// Reject empty or whitespace-only text
pub fn validate_input(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RetrievalError::InvalidInput(
            "text to embed must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// HTTP embedding provider
///
/// Implements `EmbeddingProvider` against any OpenAI-compatible `/v1/embeddings`
/// endpoint. One request per call, bounded by the configured timeout.

use super::traits::{validate_input, EmbeddingProvider};
use crate::config::EmbeddingConfig;
use crate::error::{Result, RetrievalError};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP-based embedding provider using the OpenAI request/response format
#[derive(Debug, Clone)]
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// OpenAI-style error body
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl HttpEmbeddingProvider {
    /// Build a provider from configuration
    ///
    /// Missing credentials are not an error here; they surface from
    /// `ensure_configured` on first use.
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build embedding HTTP client")?;

        Ok(Self {
            client,
            url: config.url.trim().to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        validate_input(text)?;
        self.ensure_configured()?;

        let mut request = self.client.post(&self.url).json(&EmbeddingRequest {
            model: &self.model,
            input: text,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            RetrievalError::Embedding(format!("request to {} failed: {}", self.url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .map(|detail| detail.message)
                .unwrap_or(body);
            tracing::warn!("❌ Embedding API returned {}: {}", status.as_u16(), message);
            return Err(RetrievalError::Embedding(format!(
                "embedding API returned {}: {}",
                status.as_u16(),
                message
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            RetrievalError::Embedding(format!("failed to parse embedding response: {}", e))
        })?;
        parsed.data.sort_by_key(|d| d.index);

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                RetrievalError::Embedding("embedding API returned no vector".to_string())
            })?;
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(RetrievalError::Embedding(
                "embedding API returned a non-finite component".to_string(),
            ));
        }

        tracing::debug!("🧮 Embedded {} chars into {} dimensions", text.len(), vector.len());
        Ok(vector)
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(RetrievalError::Configuration(
                "EMBEDDING_URL is not set".to_string(),
            ));
        }
        if self.api_key.is_none() {
            return Err(RetrievalError::Configuration(
                "EMBEDDING_API_KEY / OPENAI_API_KEY is not set".to_string(),
            ));
        }
        Ok(())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

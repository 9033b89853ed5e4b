/// Configuration management for flowdraft
///
/// Handles server binding, catalog locations, and the external endpoints used for
/// embeddings, generation and deployment. Everything can be set through environment
/// variables (a `.env` file is loaded first by the binary).

use crate::catalog::CatalogPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Template catalog configuration
    pub catalog: CatalogConfig,
    /// Embedding endpoint configuration
    pub embedding: EmbeddingConfig,
    /// Chat-completions endpoint configuration
    pub generation: GenerationConfig,
    /// n8n deployment target
    pub n8n: N8nConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Where the catalogs live and how long a loaded snapshot is trusted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Template catalog written by the index job (default: "templates/index.json")
    pub index_path: PathBuf,
    /// Embedding catalog written by the embed job (default: "templates/embeddings.json")
    pub embeddings_path: PathBuf,
    /// Reload on every request, or cache until explicitly reloaded
    pub policy: CatalogPolicy,
    /// Templates retrieved when a request does not say
    pub default_top_k: i64,
}

/// OpenAI-compatible embeddings endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub url: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
}

/// OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub url: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// n8n REST API, both values may be supplied per request instead
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct N8nConfig {
    pub api_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Config {
    /// Build configuration from an arbitrary variable lookup
    ///
    /// `Default` uses the process environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let parsed = |key: &str, default: u64| {
            var(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        };

        let openai_key = var("OPENAI_API_KEY");

        Self {
            server: ServerConfig {
                host: var_or("FLOWDRAFT_HOST", "0.0.0.0"),
                port: var("FLOWDRAFT_PORT")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(3001),
            },
            catalog: CatalogConfig {
                index_path: var_or("FLOWDRAFT_TEMPLATE_INDEX", "templates/index.json").into(),
                embeddings_path: var_or("FLOWDRAFT_TEMPLATE_EMBEDDINGS", "templates/embeddings.json")
                    .into(),
                policy: match var("FLOWDRAFT_CATALOG_POLICY").map(|v| v.parse::<CatalogPolicy>()) {
                    Some(Ok(policy)) => policy,
                    Some(Err(e)) => {
                        tracing::warn!("⚠️ {}, falling back to reload", e);
                        CatalogPolicy::Reload
                    }
                    None => CatalogPolicy::Reload,
                },
                default_top_k: var("FLOWDRAFT_DEFAULT_TOP_K")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(crate::retrieval::DEFAULT_TOP_K),
            },
            embedding: EmbeddingConfig {
                url: var_or("EMBEDDING_URL", "https://api.openai.com/v1/embeddings"),
                model: var_or("EMBEDDING_MODEL", "text-embedding-3-small"),
                api_key: var("EMBEDDING_API_KEY").or_else(|| openai_key.clone()),
                timeout_secs: parsed("EMBEDDING_TIMEOUT_SECS", 30),
            },
            generation: GenerationConfig {
                url: var_or("OPENAI_CHAT_URL", "https://api.openai.com/v1/chat/completions"),
                model: var_or("OPENAI_MODEL", "gpt-4o"),
                api_key: openai_key,
                timeout_secs: parsed("GENERATION_TIMEOUT_SECS", 120),
            },
            n8n: N8nConfig {
                api_url: var("N8N_API_URL"),
                api_key: var("N8N_API_KEY"),
            },
        }
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

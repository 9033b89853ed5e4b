/// JSON-file persistence for the template and embedding catalogs
///
/// The ingestion jobs write both catalogs in full; the retrieval service reads them
/// back through the `TemplateStore` trait. Loads are all-or-nothing: one malformed
/// record fails the whole load.

use crate::catalog::types::{Template, TemplateEmbedding};
use crate::error::{Result, RetrievalError};
use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

/// Read-side access to the persisted catalogs
///
/// Implementations must be thread-safe so they can be shared behind
/// `Arc<dyn TemplateStore>` by concurrent requests.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Load every template in catalog order
    async fn load_templates(&self) -> Result<Vec<Template>>;

    /// Load the embedding catalog as id -> vector
    async fn load_embeddings(&self) -> Result<HashMap<String, Vec<f32>>>;
}

/// File-backed store reading `index.json` and `embeddings.json`
#[derive(Debug, Clone)]
pub struct JsonTemplateStore {
    index_path: PathBuf,
    embeddings_path: PathBuf,
}

impl JsonTemplateStore {
    /// Create a store over the two catalog files
    pub fn new(index_path: impl Into<PathBuf>, embeddings_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            embeddings_path: embeddings_path.into(),
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn embeddings_path(&self) -> &Path {
        &self.embeddings_path
    }
}

#[async_trait]
impl TemplateStore for JsonTemplateStore {
    async fn load_templates(&self) -> Result<Vec<Template>> {
        let templates: Vec<Template> = read_json(&self.index_path).await?;

        let mut seen = HashSet::with_capacity(templates.len());
        for (position, template) in templates.iter().enumerate() {
            if template.id.trim().is_empty() {
                return Err(RetrievalError::store_load(
                    &self.index_path,
                    format!("record {} has an empty id", position),
                ));
            }
            if template.title.trim().is_empty() || template.category.trim().is_empty() {
                return Err(RetrievalError::store_load(
                    &self.index_path,
                    format!("template '{}' has an empty title or category", template.id),
                ));
            }
            if !seen.insert(template.id.as_str()) {
                return Err(RetrievalError::store_load(
                    &self.index_path,
                    format!("duplicate template id '{}'", template.id),
                ));
            }
        }

        tracing::debug!("📚 Loaded {} templates from {}", templates.len(), self.index_path.display());
        Ok(templates)
    }

    async fn load_embeddings(&self) -> Result<HashMap<String, Vec<f32>>> {
        let records: Vec<TemplateEmbedding> = read_json(&self.embeddings_path).await?;

        // f32 narrowing turns out-of-range numbers into inf
        if let Some(record) = records
            .iter()
            .find(|r| r.embedding.iter().any(|v| !v.is_finite()))
        {
            return Err(RetrievalError::store_load(
                &self.embeddings_path,
                format!("embedding for '{}' has a non-finite component", record.id),
            ));
        }

        // Later records override earlier ones with the same id
        let embeddings: HashMap<String, Vec<f32>> = records
            .into_iter()
            .map(|record| (record.id, record.embedding))
            .collect();

        tracing::debug!(
            "🧮 Loaded {} embeddings from {}",
            embeddings.len(),
            self.embeddings_path.display()
        );
        Ok(embeddings)
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RetrievalError::store_load(path, e))?;
    serde_json::from_str(&raw).map_err(|e| RetrievalError::store_load(path, e))
}

/// Write the template catalog in full
pub async fn write_templates(path: &Path, templates: &[Template]) -> anyhow::Result<()> {
    write_json(path, templates).await
}

/// Write the embedding catalog in full
pub async fn write_embeddings(path: &Path, embeddings: &[TemplateEmbedding]) -> anyhow::Result<()> {
    write_json(path, embeddings).await
}

/// Pretty-print to a sibling temp file, then rename over the target
///
/// The rename keeps a concurrently reloading server from observing a half-written
/// catalog.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let body = serde_json::to_string_pretty(value)?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, body)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to move {} into place", path.display()))?;

    Ok(())
}

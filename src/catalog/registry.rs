/// Catalog snapshots with a configurable staleness policy
///
/// Holds the joined template + embedding state behind an `ArcSwapOption`. Every
/// reload builds a complete snapshot first and then swaps the pointer, so readers
/// never see templates joined against a half-loaded embedding set.

use crate::catalog::{store::TemplateStore, types::Template};
use crate::error::Result;
use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, str::FromStr, sync::Arc};

/// How long a loaded snapshot may be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogPolicy {
    /// Load both catalogs from the store on every request (always fresh, slower)
    #[default]
    Reload,
    /// Load once, then reuse until `invalidate` or `reload` is called
    Cached,
}

impl FromStr for CatalogPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reload" => Ok(Self::Reload),
            "cached" | "cache" => Ok(Self::Cached),
            other => Err(anyhow::anyhow!("Unknown catalog policy: {}", other)),
        }
    }
}

/// One consistent view of both catalogs
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    /// Templates in catalog order
    pub templates: Vec<Template>,
    /// Template id -> embedding vector
    pub embeddings: HashMap<String, Vec<f32>>,
}

impl CatalogSnapshot {
    /// Templates paired with their vectors, in catalog order
    ///
    /// Templates without a vector are left out.
    pub fn embedded_templates(&self) -> impl Iterator<Item = (&Template, &[f32])> {
        self.templates.iter().filter_map(|template| {
            self.embeddings
                .get(&template.id)
                .map(|vector| (template, vector.as_slice()))
        })
    }
}

/// Shared catalog handle used by the retrieval service
pub struct TemplateCatalog {
    store: Arc<dyn TemplateStore>,
    policy: CatalogPolicy,
    current: ArcSwapOption<CatalogSnapshot>,
}

impl TemplateCatalog {
    pub fn new(store: Arc<dyn TemplateStore>, policy: CatalogPolicy) -> Self {
        Self {
            store,
            policy,
            current: ArcSwapOption::empty(),
        }
    }

    pub fn policy(&self) -> CatalogPolicy {
        self.policy
    }

    /// Snapshot to rank against, honouring the staleness policy
    pub async fn snapshot(&self) -> Result<Arc<CatalogSnapshot>> {
        match self.policy {
            CatalogPolicy::Reload => self.load().await.map(Arc::new),
            CatalogPolicy::Cached => match self.current.load_full() {
                Some(snapshot) => Ok(snapshot),
                None => self.reload().await,
            },
        }
    }

    /// Load a fresh snapshot and swap it in atomically
    pub async fn reload(&self) -> Result<Arc<CatalogSnapshot>> {
        let snapshot = Arc::new(self.load().await?);
        self.current.store(Some(Arc::clone(&snapshot)));

        tracing::info!(
            "🔄 Catalog reloaded: {} templates, {} embeddings",
            snapshot.templates.len(),
            snapshot.embeddings.len()
        );
        Ok(snapshot)
    }

    /// Drop the cached snapshot; the next `snapshot` call loads again
    pub fn invalidate(&self) {
        self.current.store(None);
        tracing::debug!("🗑️ Catalog snapshot invalidated");
    }

    async fn load(&self) -> Result<CatalogSnapshot> {
        let (templates, embeddings) =
            tokio::try_join!(self.store.load_templates(), self.store.load_embeddings())?;
        Ok(CatalogSnapshot { templates, embeddings })
    }
}

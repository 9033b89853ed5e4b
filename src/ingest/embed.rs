/// Embed job: one embedding call per template, written as the embedding catalog
///
/// Templates whose embedding call fails are logged and left out; the retrieval
/// service tolerates the gap by skipping them.

use crate::catalog::{store::write_embeddings, JsonTemplateStore, TemplateEmbedding, TemplateStore};
use crate::embedding::EmbeddingProvider;
use anyhow::Result;
use std::time::Duration;

/// Outcome counts for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedReport {
    pub embedded: usize,
    pub skipped: usize,
}

/// Embed every template of the store's catalog and overwrite its embedding catalog
///
/// `delay` is slept between calls to stay under provider rate limits.
pub async fn run(
    store: &JsonTemplateStore,
    provider: &dyn EmbeddingProvider,
    delay: Duration,
) -> Result<EmbedReport> {
    provider.ensure_configured()?;
    let templates = store.load_templates().await?;

    let mut embeddings = Vec::with_capacity(templates.len());
    let mut skipped = 0;

    for (position, template) in templates.iter().enumerate() {
        if position > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match provider.embed(&template.embedding_input()).await {
            Ok(embedding) => {
                tracing::debug!("🧮 Embedded {} ({} dims)", template.id, embedding.len());
                embeddings.push(TemplateEmbedding {
                    id: template.id.clone(),
                    embedding,
                });
            }
            Err(e) => {
                tracing::error!("❌ Skipping {} due to embedding failure: {}", template.id, e);
                skipped += 1;
            }
        }
    }

    write_embeddings(store.embeddings_path(), &embeddings).await?;
    tracing::info!(
        "✅ Wrote {} embeddings to {} ({} skipped)",
        embeddings.len(),
        store.embeddings_path().display(),
        skipped
    );

    Ok(EmbedReport {
        embedded: embeddings.len(),
        skipped,
    })
}

/// Annotate job: fill in missing descriptions and tags with a generative model
///
/// Only templates with a blank description or no tags are sent. A failed call leaves
/// that template untouched. The template catalog is rewritten in full at the end.

use crate::catalog::{store::write_templates, JsonTemplateStore, Template, TemplateStore};
use crate::generation::{Annotation, OpenAiClient};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Source of template annotations
#[async_trait]
pub trait TemplateAnnotator: Send + Sync {
    async fn annotate(&self, template: &Template) -> Result<Annotation>;
}

#[async_trait]
impl TemplateAnnotator for OpenAiClient {
    async fn annotate(&self, template: &Template) -> Result<Annotation> {
        OpenAiClient::annotate(self, template).await
    }
}

/// Annotate what needs it and rewrite the catalog; returns the number updated
pub async fn run(
    store: &JsonTemplateStore,
    annotator: &dyn TemplateAnnotator,
    delay: Duration,
) -> Result<usize> {
    let mut templates = store.load_templates().await?;
    let mut updated = 0;

    for (attempt, template) in templates
        .iter_mut()
        .filter(|t| t.needs_annotation())
        .enumerate()
    {
        if attempt > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match annotator.annotate(template).await {
            Ok(annotation) => {
                template.description = annotation.description;
                template.tags = annotation.tags;
                updated += 1;
                tracing::debug!("🏷️ Annotated {}", template.id);
            }
            Err(e) => tracing::error!("❌ Failed to annotate {}: {:#}", template.id, e),
        }
    }

    write_templates(store.index_path(), &templates).await?;
    tracing::info!(
        "✅ Annotated {} templates. Updated file: {}",
        updated,
        store.index_path().display()
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct FakeAnnotator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TemplateAnnotator for FakeAnnotator {
        async fn annotate(&self, template: &Template) -> Result<Annotation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if template.id == "broken" {
                anyhow::bail!("model refused");
            }
            Ok(Annotation {
                description: format!("About {}", template.title),
                tags: vec![template.category.to_lowercase()],
            })
        }
    }

    fn template(id: &str, description: &str, tags: &[&str]) -> Template {
        Template {
            id: id.to_string(),
            file_name: format!("{}.json", id),
            category: "CRM".to_string(),
            title: id.to_uppercase(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            node_types: vec![],
            workflow: json!({ "nodes": [] }),
        }
    }

    #[tokio::test]
    async fn test_only_incomplete_templates_are_annotated() {
        let dir = tempdir().unwrap();
        let store = JsonTemplateStore::new(dir.path().join("index.json"), dir.path().join("embeddings.json"));
        write_templates(
            store.index_path(),
            &[
                template("done", "Already described", &["crm"]),
                template("no-tags", "Has text", &[]),
                template("blank", " ", &["x"]),
                template("broken", "", &[]),
            ],
        )
        .await
        .unwrap();

        let annotator = FakeAnnotator { calls: AtomicUsize::new(0) };
        let updated = run(&store, &annotator, Duration::ZERO).await.unwrap();
        assert_eq!(updated, 2);
        assert_eq!(annotator.calls.load(Ordering::SeqCst), 3);

        let templates = store.load_templates().await.unwrap();
        assert_eq!(templates[0].description, "Already described");
        assert_eq!(templates[1].description, "About NO-TAGS");
        assert_eq!(templates[1].tags, vec!["crm"]);
        assert_eq!(templates[2].description, "About BLANK");
        assert!(templates[3].description.is_empty());
        assert!(templates[3].tags.is_empty());
    }
}

/// Retrieval service: the single entry point for template lookup
///
/// Given free text, returns the K most relevant templates from the catalog. The
/// store and the embedding provider are injected so either can be replaced.

use crate::catalog::{Template, TemplateCatalog};
use crate::embedding::{validate_input, EmbeddingProvider};
use crate::error::Result;
use crate::retrieval::ranker::{rank_top_k, Ranked, DEFAULT_TOP_K};
use std::sync::Arc;

/// Template retrieval over a catalog and an embedding provider
pub struct RetrievalService {
    catalog: Arc<TemplateCatalog>,
    embedder: Arc<dyn EmbeddingProvider>,
    default_top_k: i64,
}

impl RetrievalService {
    pub fn new(catalog: Arc<TemplateCatalog>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            catalog,
            embedder,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the `top_k` used when a caller passes `None`
    pub fn with_default_top_k(mut self, top_k: i64) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn catalog(&self) -> &Arc<TemplateCatalog> {
        &self.catalog
    }

    /// Most relevant templates for `query`, best first
    pub async fn find_similar_templates(&self, query: &str, top_k: Option<i64>) -> Result<Vec<Template>> {
        let ranked = self.find_scored_templates(query, top_k).await?;
        Ok(ranked.into_iter().map(|r| r.item).collect())
    }

    /// Same ranking as `find_similar_templates`, with each template's score
    ///
    /// Order of checks: provider configuration, then query text, then `top_k`.
    /// All three happen before the catalog or the network is touched.
    pub async fn find_scored_templates(
        &self,
        query: &str,
        top_k: Option<i64>,
    ) -> Result<Vec<Ranked<Template>>> {
        self.embedder.ensure_configured()?;
        validate_input(query)?;

        let top_k = top_k.unwrap_or(self.default_top_k);
        if top_k <= 0 {
            tracing::debug!("⏭️ top_k = {}, skipping retrieval", top_k);
            return Ok(Vec::new());
        }

        let snapshot = self.catalog.snapshot().await?;
        let query_vector = self.embedder.embed(query).await?;

        let ranked = rank_top_k(&query_vector, snapshot.embedded_templates(), top_k);

        tracing::info!(
            "🔍 Retrieved {} of {} templates (model: {}, top_k: {})",
            ranked.len(),
            snapshot.templates.len(),
            self.embedder.model_name(),
            top_k
        );

        Ok(ranked
            .into_iter()
            .map(|r| Ranked {
                item: r.item.clone(),
                score: r.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogPolicy, TemplateStore};
    use crate::error::RetrievalError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory catalog
    struct FakeStore {
        templates: Vec<Template>,
        embeddings: HashMap<String, Vec<f32>>,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl TemplateStore for FakeStore {
        async fn load_templates(&self) -> Result<Vec<Template>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.templates.clone())
        }

        async fn load_embeddings(&self) -> Result<HashMap<String, Vec<f32>>> {
            Ok(self.embeddings.clone())
        }
    }

    /// Returns a fixed vector and counts calls
    struct FixedEmbedder {
        vector: Vec<f32>,
        configured: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.vector.clone())
        }

        fn ensure_configured(&self) -> Result<()> {
            if self.configured {
                Ok(())
            } else {
                Err(RetrievalError::Configuration("no key".to_string()))
            }
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(RetrievalError::Embedding("upstream 500".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn template(id: &str) -> Template {
        Template {
            id: id.to_string(),
            file_name: format!("{}.json", id),
            category: "General".to_string(),
            title: format!("Template {}", id),
            description: String::new(),
            tags: vec![],
            node_types: vec![],
            workflow: json!({ "name": id }),
        }
    }

    struct Harness {
        service: RetrievalService,
        store: Arc<FakeStore>,
        embedder: Arc<FixedEmbedder>,
    }

    fn harness(entries: &[(&str, Option<Vec<f32>>)], query_vector: Vec<f32>, configured: bool) -> Harness {
        let store = Arc::new(FakeStore {
            templates: entries.iter().map(|(id, _)| template(id)).collect(),
            embeddings: entries
                .iter()
                .filter_map(|(id, v)| v.clone().map(|v| (id.to_string(), v)))
                .collect(),
            loads: AtomicUsize::new(0),
        });
        let embedder = Arc::new(FixedEmbedder {
            vector: query_vector,
            configured,
            calls: AtomicUsize::new(0),
        });
        let catalog = Arc::new(TemplateCatalog::new(store.clone(), CatalogPolicy::Reload));
        Harness {
            service: RetrievalService::new(catalog, embedder.clone()),
            store,
            embedder,
        }
    }

    fn ids(templates: &[Template]) -> Vec<&str> {
        templates.iter().map(|t| t.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_ranks_three_template_scenario() {
        let h = harness(
            &[
                ("t10", Some(vec![1.0, 0.0])),
                ("t01", Some(vec![0.0, 1.0])),
                ("t11", Some(vec![1.0, 1.0])),
            ],
            vec![1.0, 0.0],
            true,
        );

        let all = h.service.find_similar_templates("csv to sheets", Some(3)).await.unwrap();
        assert_eq!(ids(&all), vec!["t10", "t11", "t01"]);

        let top2 = h.service.find_similar_templates("csv to sheets", Some(2)).await.unwrap();
        assert_eq!(ids(&top2), vec!["t10", "t11"]);
    }

    #[tokio::test]
    async fn test_returns_full_template_records() {
        let h = harness(&[("only", Some(vec![1.0]))], vec![1.0], true);
        let found = h.service.find_similar_templates("anything", None).await.unwrap();
        assert_eq!(found, vec![template("only")]);
    }

    #[tokio::test]
    async fn test_default_top_k_is_five() {
        let entries: Vec<(String, Option<Vec<f32>>)> =
            (0..8).map(|i| (format!("t{}", i), Some(vec![1.0, i as f32]))).collect();
        let borrowed: Vec<(&str, Option<Vec<f32>>)> =
            entries.iter().map(|(id, v)| (id.as_str(), v.clone())).collect();
        let h = harness(&borrowed, vec![1.0, 0.0], true);

        let found = h.service.find_similar_templates("q", None).await.unwrap();
        assert_eq!(found.len(), 5);
        assert_eq!(found[0].id, "t0");
    }

    #[tokio::test]
    async fn test_templates_without_embeddings_never_appear() {
        let h = harness(
            &[
                ("missing", None),
                ("a", Some(vec![0.0, 1.0])),
                ("also-missing", None),
            ],
            vec![0.0, 1.0],
            true,
        );

        let found = h.service.find_similar_templates("q", Some(10)).await.unwrap();
        assert_eq!(ids(&found), vec!["a"]);
    }

    #[tokio::test]
    async fn test_empty_embedding_catalog_is_empty_result() {
        let h = harness(&[("a", None), ("b", None)], vec![1.0], true);
        let found = h.service.find_similar_templates("q", Some(3)).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_top_k_is_empty_without_io() {
        let h = harness(&[("a", Some(vec![1.0]))], vec![1.0], true);
        for k in [0, -3] {
            let found = h.service.find_similar_templates("q", Some(k)).await.unwrap();
            assert!(found.is_empty());
        }
        assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.store.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_query_is_invalid_input_with_no_embedding_call() {
        let h = harness(&[("a", Some(vec![1.0]))], vec![1.0], true);
        for query in ["", "   ", "\n\t"] {
            let err = h.service.find_similar_templates(query, Some(3)).await.unwrap_err();
            assert!(matches!(err, RetrievalError::InvalidInput(_)));
        }
        assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.store.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_fails_before_io() {
        let h = harness(&[("a", Some(vec![1.0]))], vec![1.0], false);
        let err = h.service.find_similar_templates("q", Some(3)).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Configuration(_)));
        assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.store.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates_unchanged() {
        let store = Arc::new(FakeStore {
            templates: vec![template("a")],
            embeddings: HashMap::from([("a".to_string(), vec![1.0])]),
            loads: AtomicUsize::new(0),
        });
        let catalog = Arc::new(TemplateCatalog::new(store, CatalogPolicy::Reload));
        let service = RetrievalService::new(catalog, Arc::new(FailingEmbedder));

        match service.find_similar_templates("q", None).await {
            Err(RetrievalError::Embedding(message)) => assert_eq!(message, "upstream 500"),
            other => panic!("expected embedding error, got {:?}", other.map(|t| t.len())),
        }
    }

    #[tokio::test]
    async fn test_scores_are_non_increasing() {
        let h = harness(
            &[
                ("a", Some(vec![0.1, 0.9])),
                ("b", Some(vec![0.8, 0.2])),
                ("c", Some(vec![-1.0, 0.0])),
                ("d", Some(vec![0.5, 0.5])),
            ],
            vec![1.0, 0.0],
            true,
        );

        let scored = h.service.find_scored_templates("q", Some(4)).await.unwrap();
        assert_eq!(scored.len(), 4);
        for pair in scored.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(scored[0].item.id, "b");
        assert_eq!(scored[3].item.id, "c");
    }

    #[tokio::test]
    async fn test_custom_default_top_k() {
        let h = harness(
            &[("a", Some(vec![1.0])), ("b", Some(vec![1.0])), ("c", Some(vec![1.0]))],
            vec![1.0],
            true,
        );
        let service = h.service.with_default_top_k(2);
        let found = service.find_similar_templates("q", None).await.unwrap();
        assert_eq!(ids(&found), vec!["a", "b"]);
    }
}

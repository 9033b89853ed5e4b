/// Template catalog type definitions
///
/// Defines the persisted shapes of the template catalog (`index.json`) and the
/// embedding catalog (`embeddings.json`). Both are JSON arrays in camelCase and are
/// joined by template id at query time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One example workflow in the template corpus
///
/// Produced by the index job, optionally enriched by the annotate job, and loaded
/// read-only by the retrieval service. The `workflow` body is never inspected by
/// ranking; it is handed to the generation step untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Stable identifier, `"<category>/<file stem>"` when built by the index job
    pub id: String,
    /// Source file name inside the category directory
    #[serde(default)]
    pub file_name: String,
    /// Grouping label, taken from the category directory name
    pub category: String,
    /// Display title (workflow `name` or the file stem)
    pub title: String,
    /// Free-text summary, empty until annotated
    #[serde(default)]
    pub description: String,
    /// Ordered keywords, empty until annotated
    #[serde(default)]
    pub tags: Vec<String>,
    /// Distinct node types used by the workflow, in first-seen order
    #[serde(default)]
    pub node_types: Vec<String>,
    /// Full n8n workflow definition
    pub workflow: Value,
}

impl Template {
    /// Short projection returned to API callers alongside a generated workflow
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
        }
    }

    /// True when the annotate job still has work to do for this template
    pub fn needs_annotation(&self) -> bool {
        self.description.trim().is_empty() || self.tags.is_empty()
    }

    /// Text fed to the embedding provider when building the embedding catalog
    pub fn embedding_input(&self) -> String {
        [
            format!("Category: {}", self.category),
            format!("Title: {}", self.title),
            format!("Description: {}", self.description),
            format!("Tags: {}", self.tags.join(" ")),
            format!("NodeTypes: {}", self.node_types.join(" ")),
        ]
        .join("\n")
    }
}

/// Embedding record, `id` references exactly one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEmbedding {
    pub id: String,
    pub embedding: Vec<f32>,
}

/// Template metadata without the workflow body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
}

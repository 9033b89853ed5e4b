/// Template Catalog Layer
///
/// Everything about the persisted template corpus:
/// - Type definitions (Template, TemplateEmbedding)
/// - JSON-file persistence behind the `TemplateStore` trait
/// - Snapshot registry with a reload-or-cache staleness policy

// Core catalog type definitions
pub mod types;

// JSON persistence for both catalogs
pub mod store;

// Atomic snapshot registry using ArcSwap
pub mod registry;

pub use registry::{CatalogPolicy, CatalogSnapshot, TemplateCatalog};
pub use store::{JsonTemplateStore, TemplateStore};
pub use types::{Template, TemplateEmbedding, TemplateSummary};

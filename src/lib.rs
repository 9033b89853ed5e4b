/// flowdraft: template-grounded n8n workflow drafting
///
/// Retrieves the stored workflow templates most similar to a natural-language request,
/// hands them to a generative model as reference material and deploys the result to n8n.

// Core configuration and setup
pub mod config;

// Retrieval error taxonomy
pub mod error;

// Template catalog - records, JSON stores and the snapshot registry
pub mod catalog;

// Embedding providers
pub mod embedding;

// Similarity ranking and the retrieval service
pub mod retrieval;

// Prompting, external context and the chat-completions client
pub mod generation;

// n8n deployment client
pub mod deploy;

// Offline jobs that build the catalogs
pub mod ingest;

// HTTP API layer
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use catalog::{CatalogPolicy, JsonTemplateStore, Template, TemplateCatalog, TemplateStore};
pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider};
pub use error::{Result, RetrievalError};
pub use retrieval::{cosine_similarity, rank_top_k, RetrievalService};
pub use server::start_server;

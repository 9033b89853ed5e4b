/// Embedding Provider Layer
///
/// Converts text into fixed-length vectors through an external service.
/// - `EmbeddingProvider` trait: async seam injected into the retrieval service
/// - `HttpEmbeddingProvider`: any OpenAI-compatible `/v1/embeddings` endpoint

pub mod provider;
pub mod traits;

pub use provider::HttpEmbeddingProvider;
pub use traits::{validate_input, EmbeddingProvider};

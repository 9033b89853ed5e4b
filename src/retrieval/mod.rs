/// Template Retrieval
///
/// The algorithmic core of the crate:
/// - Cosine similarity and stable top-K ranking
/// - The retrieval service that embeds a query and ranks the catalog against it

// Pure ranking functions
pub mod ranker;

// Store + embedder orchestration
pub mod service;

pub use ranker::{cosine_similarity, rank_top_k, Ranked, DEFAULT_TOP_K};
pub use service::RetrievalService;

/// Offline Ingestion Jobs
///
/// Batch jobs that produce the catalogs the retrieval service reads:
/// - index: scan category folders of workflow exports into `index.json`
/// - annotate: fill missing descriptions/tags through the generation client
/// - embed: one embedding per template into `embeddings.json`
///
/// Every job overwrites its output in full.

pub mod annotate;
pub mod embed;
pub mod index;

pub use annotate::TemplateAnnotator;
pub use embed::EmbedReport;

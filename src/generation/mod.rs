/// Generation Layer
///
/// Drafts workflows from a description plus retrieved templates, runs the planning
/// chat, and annotates templates for the ingestion jobs.

pub mod client;
pub mod context;
pub mod prompt;

pub use client::{
    Annotation, ChatMessage, ChatRequest, GenerationRequest, OpenAiClient, WorkflowGenerator,
};
pub use context::{build_external_context, ExternalContextOptions};
pub use prompt::Language;

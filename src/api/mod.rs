/// HTTP API Layer
///
/// REST endpoints for the drafting flow:
/// - Planning chat
/// - Workflow generation and deployment
/// - Template search and catalog reload

use crate::deploy::N8nClient;
use crate::error::RetrievalError;
use crate::generation::WorkflowGenerator;
use crate::retrieval::RetrievalService;
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

// Planning chat endpoint
pub mod chat;

// Forgiving request field decoders
pub mod lenient;

// Template search and reload endpoints
pub mod templates;

// Generate and deploy endpoints
pub mod workflows;

pub use chat::create_chat_routes;
pub use templates::create_template_routes;
pub use workflows::create_workflow_routes;

/// Application state containing shared collaborators
#[derive(Clone)]
pub struct AppState {
    /// Template retrieval over the catalog
    pub retrieval: Arc<RetrievalService>,
    /// Workflow drafting and planning chat
    pub generator: Arc<dyn WorkflowGenerator>,
    /// n8n deployment client
    pub deployer: Arc<N8nClient>,
}

/// Error half of every handler result: status plus `{ "error": ... }`
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

/// Unwrap a JSON body, answering unreadable bodies with 400 `{ "error": ... }`
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::warn!("⚠️ Rejected request body: {}", rejection.body_text());
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })
}

/// Map a retrieval failure onto an HTTP status
pub(crate) fn retrieval_error(error: RetrievalError) -> ApiError {
    let status = match &error {
        RetrievalError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RetrievalError::Embedding(_) => StatusCode::BAD_GATEWAY,
        RetrievalError::Configuration(_) | RetrievalError::StoreLoad { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    tracing::error!("❌ Template retrieval failed: {}", error);
    api_error(status, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_error_statuses() {
        let cases = [
            (RetrievalError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (RetrievalError::Embedding("x".into()), StatusCode::BAD_GATEWAY),
            (RetrievalError::Configuration("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                RetrievalError::StoreLoad { path: "index.json".into(), reason: "x".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            let (status, Json(body)) = retrieval_error(error);
            assert_eq!(status, expected);
            assert!(body["error"].is_string());
        }
    }
}

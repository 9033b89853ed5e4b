/// Workflow generation and deployment endpoints
///
/// Generation retrieves similar templates, builds the external context and asks the
/// generator for a workflow. Deployment forwards a workflow to n8n.

use crate::api::{api_error, json_body, lenient, retrieval_error, ApiError, AppState};
use crate::catalog::TemplateSummary;
use crate::deploy::{DeployMode, N8nTarget};
use crate::generation::{build_external_context, ExternalContextOptions, GenerationRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Request body for workflow generation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::top_k")]
    pub top_k: Option<i64>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub target_urls: Vec<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub enable_web_search: bool,
    #[serde(default, deserialize_with = "lenient::string")]
    pub openai_api_key: Option<String>,
}

/// Response for a generated workflow
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub workflow_json: Value,
    pub similar_templates: Vec<TemplateSummary>,
}

/// Request body for deployment
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub workflow_json: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub workflow_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub n8n_api_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub n8n_api_key: Option<String>,
}

/// Create workflow routes
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows/generate", post(generate_workflow))
        .route("/api/workflows/deploy", post(deploy_workflow))
}

/// Draft a workflow from a description
///
/// POST /api/workflows/generate
/// Body: { "description": "...", "topK": 5, "targetUrls": [...], "enableWebSearch": false }
/// Returns: { "workflowJson": {...}, "similarTemplates": [{ "id", "title", "category", "tags" }] }
async fn generate_workflow(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let payload = json_body(payload)?;
    let description = match payload.description {
        Some(d) if !d.is_empty() => d,
        _ => return Err(api_error(StatusCode::BAD_REQUEST, "description is required")),
    };

    let request_id = Uuid::new_v4();
    tracing::info!("📥 Generate request {} received", request_id);
    let started = std::time::Instant::now();

    let templates = state
        .retrieval
        .find_similar_templates(&description, payload.top_k)
        .await
        .map_err(retrieval_error)?;
    tracing::debug!("📚 Request {} retrieved {} templates", request_id, templates.len());

    let external_context = build_external_context(&ExternalContextOptions {
        description: &description,
        target_urls: &payload.target_urls,
        enable_web_search: payload.enable_web_search,
    });

    let similar_templates: Vec<TemplateSummary> = templates.iter().map(|t| t.summary()).collect();

    let workflow_json = state
        .generator
        .generate_workflow(GenerationRequest {
            description,
            templates,
            external_context: Some(external_context),
            api_key: payload.openai_api_key,
        })
        .await
        .map_err(|e| {
            tracing::error!("❌ Generate request {} failed: {:#}", request_id, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        })?;

    tracing::info!("🎉 Generate request {} completed in {:?}", request_id, started.elapsed());

    Ok(Json(GenerateResponse {
        workflow_json,
        similar_templates,
    }))
}

/// Push a workflow to n8n
///
/// POST /api/workflows/deploy
/// Body: { "workflowJson": {...}, "mode": "create" | "update", "workflowId": "...",
///         "n8nApiUrl": "...", "n8nApiKey": "..." }
/// Returns: { "success": true, "n8nWorkflowId": ..., "raw": {...} }
async fn deploy_workflow(
    State(state): State<AppState>,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let deploy_error = |status: StatusCode, message: String| {
        (status, Json(json!({ "success": false, "error": message })))
    };

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return Err(deploy_error(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    };

    let workflow = match payload.workflow_json {
        Some(w) if !w.is_null() => w,
        _ => {
            return Err(deploy_error(
                StatusCode::BAD_REQUEST,
                "workflowJson is required".to_string(),
            ))
        }
    };

    let target = N8nTarget {
        api_url: payload.n8n_api_url,
        api_key: payload.n8n_api_key,
    };

    let result = match DeployMode::from_request(payload.mode.as_deref()) {
        DeployMode::Create => state.deployer.create_workflow(&workflow, &target).await,
        DeployMode::Update => {
            let workflow_id = match payload.workflow_id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => {
                    return Err(deploy_error(
                        StatusCode::BAD_REQUEST,
                        "workflowId is required for update mode".to_string(),
                    ))
                }
            };
            state.deployer.update_workflow(&workflow_id, &workflow, &target).await
        }
    };

    match result {
        Ok(raw) => {
            let n8n_workflow_id = raw.get("id").cloned().unwrap_or(Value::Null);
            tracing::info!("🚀 Deployed workflow to n8n: {}", n8n_workflow_id);
            Ok(Json(json!({
                "success": true,
                "n8nWorkflowId": n8n_workflow_id,
                "raw": raw,
            })))
        }
        Err(e) => {
            tracing::error!("❌ Failed to deploy workflow: {:#}", e);
            Err(deploy_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)))
        }
    }
}

/// Template search and catalog reload endpoints

use crate::api::{api_error, json_body, lenient, retrieval_error, ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Request body for a template search
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "lenient::top_k")]
    pub top_k: Option<i64>,
}

/// One ranked template
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub score: f64,
}

pub fn create_template_routes() -> Router<AppState> {
    Router::new()
        .route("/api/templates/search", post(search_templates))
        .route("/api/templates/reload", post(reload_templates))
}

/// POST /api/templates/search
/// Body: { "query": "...", "topK": 5 }
/// Returns: { "templates": [{ "id", "title", "category", "tags", "score" }] }
async fn search_templates(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let payload = json_body(payload)?;
    let query = payload.query.unwrap_or_default();
    let ranked = state
        .retrieval
        .find_scored_templates(&query, payload.top_k)
        .await
        .map_err(retrieval_error)?;

    let hits: Vec<SearchHit> = ranked
        .into_iter()
        .map(|r| SearchHit {
            id: r.item.id,
            title: r.item.title,
            category: r.item.category,
            tags: r.item.tags,
            score: r.score,
        })
        .collect();

    Ok(Json(json!({ "templates": hits })))
}

/// POST /api/templates/reload
/// Returns: { "policy": "cached", "templates": n, "embeddings": m }
async fn reload_templates(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let catalog = state.retrieval.catalog();
    let snapshot = catalog.reload().await.map_err(|e| {
        tracing::error!("❌ Catalog reload failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;

    Ok(Json(json!({
        "policy": catalog.policy(),
        "templates": snapshot.templates.len(),
        "embeddings": snapshot.embeddings.len(),
    })))
}

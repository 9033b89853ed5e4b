/// Planning chat endpoint

use crate::api::{api_error, json_body, lenient, ApiError, AppState};
use crate::generation::{ChatMessage, ChatRequest, Language};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Request body for a chat turn
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default, deserialize_with = "lenient::history")]
    pub history: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::language")]
    pub language: Language,
    #[serde(default, deserialize_with = "lenient::string")]
    pub openai_api_key: Option<String>,
}

pub fn create_chat_routes() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat))
}

/// POST /api/chat
/// Body: { "history": [{ "role", "content" }], "message": "...", "language": "ja" | "en" }
/// Returns: { "reply": "..." }
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let payload = json_body(payload)?;
    let message = match payload.message {
        Some(m) if !m.is_empty() => m,
        _ => return Err(api_error(StatusCode::BAD_REQUEST, "message is required")),
    };

    let reply = state
        .generator
        .chat(ChatRequest {
            history: payload.history,
            message,
            language: payload.language,
            api_key: payload.openai_api_key,
        })
        .await
        .map_err(|e| {
            tracing::error!("❌ Failed to chat: {:#}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        })?;

    Ok(Json(json!({ "reply": reply })))
}

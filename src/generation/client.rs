/// Chat-completions client for drafting, planning and annotation
///
/// Talks to any OpenAI-compatible `/v1/chat/completions` endpoint. The API key comes
/// from configuration but a request may supply its own.

use crate::catalog::Template;
use crate::config::GenerationConfig;
use crate::generation::prompt::{
    annotation_response_format, annotation_user_prompt, chat_system_prompt,
    workflow_user_payload, Language, ANNOTATION_SYSTEM_PROMPT, WORKFLOW_SYSTEM_PROMPT,
};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Reply used when the model returns an empty chat message
pub const EMPTY_CHAT_REPLY: &str = "I couldn't generate a response.";

/// One turn of conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Everything needed to draft a workflow
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub description: String,
    /// Ranked reference templates
    pub templates: Vec<Template>,
    pub external_context: Option<String>,
    /// Per-request key, overrides the configured one
    pub api_key: Option<String>,
}

/// A planning-chat turn
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub language: Language,
    pub api_key: Option<String>,
}

/// Description and tags proposed for a template
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Annotation {
    pub description: String,
    pub tags: Vec<String>,
}

/// Generation seam used by the HTTP API
#[async_trait]
pub trait WorkflowGenerator: Send + Sync {
    /// Draft an importable workflow JSON object
    async fn generate_workflow(&self, request: GenerationRequest) -> Result<Value>;

    /// Produce a natural-language plan or clarifying questions
    async fn chat(&self, request: ChatRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build generation HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Ask for a description and tags for one template (annotate job)
    pub async fn annotate(&self, template: &Template) -> Result<Annotation> {
        let messages = [
            ChatMessage::new("system", ANNOTATION_SYSTEM_PROMPT),
            ChatMessage::new("user", annotation_user_prompt(template)),
        ];

        let content = self
            .complete(&messages, Some(annotation_response_format()), Some(0.2), None)
            .await?
            .filter(|c| !c.trim().is_empty())
            .context("Annotation response did not include content")?;

        serde_json::from_str(&content)
            .with_context(|| format!("Annotation response was not valid JSON: {}", content))
    }

    /// Send one completion request and return the first choice's content
    async fn complete(
        &self,
        messages: &[ChatMessage],
        response_format: Option<Value>,
        temperature: Option<f32>,
        api_key_override: Option<&str>,
    ) -> Result<Option<String>> {
        let api_key = api_key_override
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or(self.api_key.as_deref())
            .context("OPENAI_API_KEY is required (configure it or pass it with the request)")?;

        let body = CompletionRequest {
            model: &self.model,
            messages,
            response_format,
            temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach chat completions API at {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Chat completions API returned {}: {}", status.as_u16(), text);
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse chat completions response")?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

#[async_trait]
impl WorkflowGenerator for OpenAiClient {
    async fn generate_workflow(&self, request: GenerationRequest) -> Result<Value> {
        if request.description.trim().is_empty() {
            bail!("description is required");
        }

        let payload = workflow_user_payload(
            &request.description,
            &request.templates,
            request.external_context.as_deref(),
        );
        let messages = [
            ChatMessage::new("system", WORKFLOW_SYSTEM_PROMPT),
            ChatMessage::new("user", payload.to_string()),
        ];

        tracing::info!(
            "🧠 Drafting workflow with {} reference templates (model: {})",
            request.templates.len(),
            self.model
        );

        let text = self
            .complete(
                &messages,
                Some(json!({ "type": "json_object" })),
                None,
                request.api_key.as_deref(),
            )
            .await?
            .filter(|t| !t.trim().is_empty())
            .context("Model response did not include textual output")?;

        let workflow: Value = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("❌ Failed to parse workflow JSON. Raw text: {}", text);
            anyhow::anyhow!("Failed to parse workflow JSON from model: {}", e)
        })?;

        if !workflow.is_object() {
            bail!("Model returned JSON that is not an object");
        }

        Ok(workflow)
    }

    async fn chat(&self, request: ChatRequest) -> Result<String> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage::new("system", chat_system_prompt(request.language)));
        messages.extend(request.history.iter().cloned());
        messages.push(ChatMessage::new("user", request.message.clone()));

        let reply = self
            .complete(&messages, None, None, request.api_key.as_deref())
            .await?
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| EMPTY_CHAT_REPLY.to_string());

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(url: String, api_key: Option<&str>) -> OpenAiClient {
        OpenAiClient::new(&GenerationConfig {
            url,
            model: "gpt-4o".to_string(),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    #[tokio::test]
    async fn test_generate_workflow_parses_json_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sk-config"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "response_format": { "type": "json_object" }
            })))
            .respond_with(completion(r#"{"name":"Drafted","nodes":[],"connections":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let workflow = client(server.uri(), Some("sk-config"))
            .generate_workflow(GenerationRequest {
                description: "Post new RSS items to Slack".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(workflow["name"], "Drafted");
    }

    #[tokio::test]
    async fn test_request_key_overrides_configured_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sk-request"))
            .respond_with(completion(r#"{"name":"x","nodes":[],"connections":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        client(server.uri(), None)
            .generate_workflow(GenerationRequest {
                description: "anything".to_string(),
                api_key: Some("sk-request".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_generate_rejects_non_json_and_blank_replies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("Here is your workflow!"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(completion("  "))
            .mount(&server)
            .await;

        let client = client(server.uri(), Some("k"));
        let request = GenerationRequest {
            description: "d".to_string(),
            ..Default::default()
        };

        let err = client.generate_workflow(request.clone()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse workflow JSON"));

        let err = client.generate_workflow(request).await.unwrap_err();
        assert!(err.to_string().contains("did not include textual output"));
    }

    #[tokio::test]
    async fn test_generate_requires_description_and_key() {
        let no_key = client("http://127.0.0.1:1".to_string(), None);
        let err = no_key
            .generate_workflow(GenerationRequest {
                description: "d".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let err = no_key
            .generate_workflow(GenerationRequest::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("description is required"));
    }

    #[tokio::test]
    async fn test_chat_sends_history_and_falls_back_on_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": "earlier" },
                    { "role": "assistant", "content": "plan v1" },
                    { "role": "user", "content": "add a Slack step" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": null } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(server.uri(), Some("k"))
            .chat(ChatRequest {
                history: vec![
                    ChatMessage::new("user", "earlier"),
                    ChatMessage::new("assistant", "plan v1"),
                ],
                message: "add a Slack step".to_string(),
                language: Language::En,
                api_key: None,
            })
            .await
            .unwrap();

        assert_eq!(reply, EMPTY_CHAT_REPLY);
    }

    #[tokio::test]
    async fn test_annotate_parses_schema_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "temperature": 0.2,
                "response_format": { "type": "json_schema" }
            })))
            .respond_with(completion(r#"{"description":"Slackに通知します","tags":["Slack","通知"]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let template = Template {
            id: "Slack/notify".to_string(),
            file_name: "notify.json".to_string(),
            category: "Slack".to_string(),
            title: "Notify".to_string(),
            description: String::new(),
            tags: vec![],
            node_types: vec!["n8n-nodes-base.slack".to_string()],
            workflow: json!({ "nodes": [] }),
        };

        let annotation = client(server.uri(), Some("k")).annotate(&template).await.unwrap();
        assert_eq!(annotation.tags, vec!["Slack", "通知"]);
        assert_eq!(annotation.description, "Slackに通知します");
    }

    #[tokio::test]
    async fn test_error_status_surfaces_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = client(server.uri(), Some("bad"))
            .chat(ChatRequest {
                message: "hi".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid api key"));
    }
}

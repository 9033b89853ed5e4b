/// Prompt construction for workflow drafting, planning chat and annotation

use crate::catalog::Template;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Reply language for the planning chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ja,
    En,
}

impl Language {
    fn instruction(self) -> &'static str {
        match self {
            Language::Ja => "Respond in Japanese.",
            Language::En => "Respond in English.",
        }
    }
}

/// System instructions for drafting an importable n8n workflow
pub const WORKFLOW_SYSTEM_PROMPT: &str = r#"You are an assistant that designs n8n workflows.

Goal:
- From the user's task description and the reference n8n workflows provided, produce one workflow JSON document that can be imported into n8n as-is.

Inputs (as a JSON object):
- task_description: what the user wants to automate
- reference_workflows: existing n8n workflows similar to the task, with their full "workflow" JSON
- external_context: supporting notes collected beforehand, or null

Output rules:
- Output exactly one valid JSON object and nothing else. No code fences, comments or prose.
- The object must contain at least "name" (string), "nodes" (array) and "connections" (object).
- Every node must contain at least "id", "name", "type" (e.g. "n8n-nodes-base.webhook"), "typeVersion", "position" ([x, y]) and "parameters".

Using the references:
- The reference workflows run in the user's environment. Follow their node types, typeVersion values, parameter shapes and connection structure as closely as possible.
- When a reference covers a similar use case, start from it and modify it.

Web access:
- If the task involves fetching data from websites or external services, include an HTTP Request node ("n8n-nodes-base.httpRequest") with url, method, headers and body filled in.
- Never hard-code URLs, tokens or credentials that were not given. Use placeholders such as "TODO_TARGET_URL" or "TODO_API_TOKEN".
- When external_context is present, use it to shape request parsing and node parameters.

Anything unknown (URLs, credentials, webhook paths) must be a "TODO_..." placeholder string."#;

/// System instructions for the planning conversation
pub fn chat_system_prompt(language: Language) -> String {
    format!(
        "You are an expert n8n consultant. The user wants to build an automation workflow.\n\
         Your goal is to:\n\
         1. Analyze the user's request.\n\
         2. Outline a step-by-step plan for the n8n workflow.\n\
         3. Ask clarifying questions if any details are missing.\n\
         Do NOT generate JSON yet. Provide a natural language plan and questions only.\n\
         Keep the tone professional, helpful, and concise.\n\
         {}",
        language.instruction()
    )
}

/// System instructions for the annotate job
pub const ANNOTATION_SYSTEM_PROMPT: &str = "You summarize and tag n8n workflows. \
From the category, title, node types and workflow preview, write a Japanese description \
(1-3 sentences) and Japanese keyword tags. Reply with JSON only, in the form \
{\"description\": string, \"tags\": string[]}.";

/// JSON payload sent as the user turn when drafting a workflow
pub fn workflow_user_payload(
    description: &str,
    templates: &[Template],
    external_context: Option<&str>,
) -> Value {
    let references: Vec<Value> = templates
        .iter()
        .map(|t| {
            json!({
                "id": t.id,
                "category": t.category,
                "title": t.title,
                "description": t.description,
                "tags": t.tags,
                "nodeTypes": t.node_types,
                "workflow": t.workflow,
            })
        })
        .collect();

    json!({
        "task_description": description,
        "reference_workflows": references,
        "external_context": external_context,
    })
}

/// Compact preview of a template: workflow name and its first five nodes
pub fn workflow_preview(template: &Template) -> String {
    let Some(nodes) = template.workflow.get("nodes").and_then(Value::as_array) else {
        return "nodes: []".to_string();
    };

    let preview: Vec<Value> = nodes
        .iter()
        .take(5)
        .map(|node| {
            json!({
                "name": node.get("name"),
                "type": node.get("type"),
                "notes": node.get("notes").and_then(Value::as_str).unwrap_or(""),
            })
        })
        .collect();

    let name = template
        .workflow
        .get("name")
        .cloned()
        .unwrap_or_else(|| Value::String(template.title.clone()));

    serde_json::to_string_pretty(&json!({ "name": name, "nodes": preview }))
        .unwrap_or_else(|_| "nodes: []".to_string())
}

/// User turn for the annotate job
pub fn annotation_user_prompt(template: &Template) -> String {
    let node_types = if template.node_types.is_empty() {
        "unknown".to_string()
    } else {
        template.node_types.join(", ")
    };

    [
        format!("category: {}", template.category),
        format!("title: {}", template.title),
        format!("nodeTypes: {}", node_types),
        "workflowPreview:".to_string(),
        workflow_preview(template),
    ]
    .join("\n")
}

/// JSON schema enforced on annotation replies
pub fn annotation_response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "template_annotation",
            "strict": true,
            "schema": {
                "type": "object",
                "required": ["description", "tags"],
                "additionalProperties": false,
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Japanese explanation of the workflow (1-3 sentences)."
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Japanese keywords that describe the workflow."
                    }
                }
            }
        }
    })
}

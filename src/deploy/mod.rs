/// n8n deployment client
///
/// Pushes a generated workflow to a running n8n instance through its REST API.
/// The target comes from configuration and can be overridden per request.

use crate::config::N8nConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Whether a deploy creates a new workflow or patches an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    #[default]
    Create,
    Update,
}

impl DeployMode {
    /// Anything other than "update" deploys as a new workflow
    pub fn from_request(mode: Option<&str>) -> Self {
        match mode {
            Some("update") => Self::Update,
            _ => Self::Create,
        }
    }
}

/// Per-request overrides of the configured target
#[derive(Debug, Clone, Default)]
pub struct N8nTarget {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

/// REST client for n8n workflow endpoints
#[derive(Debug, Clone)]
pub struct N8nClient {
    client: reqwest::Client,
    defaults: N8nConfig,
}

impl N8nClient {
    pub fn new(defaults: N8nConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build n8n HTTP client")?;
        Ok(Self { client, defaults })
    }

    /// POST /rest/workflows
    pub async fn create_workflow(&self, workflow: &Value, target: &N8nTarget) -> Result<Value> {
        let (base_url, api_key) = self.resolve(target)?;
        let url = format!("{}/rest/workflows", base_url);
        tracing::info!("🚀 Creating workflow on n8n at {}", base_url);

        let request = self.client.post(&url).header("X-N8N-API-KEY", api_key).json(workflow);
        Self::send(request, &url).await
    }

    /// PATCH /rest/workflows/{id}
    pub async fn update_workflow(
        &self,
        workflow_id: &str,
        workflow: &Value,
        target: &N8nTarget,
    ) -> Result<Value> {
        if workflow_id.trim().is_empty() {
            bail!("workflowId is required for update.");
        }
        let (base_url, api_key) = self.resolve(target)?;
        let url = format!("{}/rest/workflows/{}", base_url, workflow_id);
        tracing::info!("🔄 Updating n8n workflow {} at {}", workflow_id, base_url);

        let request = self.client.patch(&url).header("X-N8N-API-KEY", api_key).json(workflow);
        Self::send(request, &url).await
    }

    /// Base URL without trailing slash, and the API key
    fn resolve<'a>(&'a self, target: &'a N8nTarget) -> Result<(&'a str, &'a str)> {
        let pick = |over: &'a Option<String>, default: &'a Option<String>| {
            over.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .or_else(|| default.as_deref().map(str::trim).filter(|v| !v.is_empty()))
        };

        let base_url = pick(&target.api_url, &self.defaults.api_url).context(
            "N8N_API_URL is not set. Please add it to your environment or provide it per request.",
        )?;
        let api_key = pick(&target.api_key, &self.defaults.api_key).context(
            "N8N_API_KEY is not set. Please add it to your environment or provide it per request.",
        )?;

        Ok((base_url.trim_end_matches('/'), api_key))
    }

    async fn send(request: reqwest::RequestBuilder, url: &str) -> Result<Value> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach n8n at {}", url))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            bail!("n8n returned {}: {}", status.as_u16(), body);
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).context("n8n response was not valid JSON")
    }
}

/// Server setup and initialization
///
/// Wires together all components: template catalog, embedding provider, retrieval
/// service, generation and deployment clients, and HTTP routes.

use crate::{
    api::{create_chat_routes, create_template_routes, create_workflow_routes, AppState},
    catalog::{JsonTemplateStore, TemplateCatalog},
    config::Config,
    deploy::N8nClient,
    embedding::HttpEmbeddingProvider,
    generation::OpenAiClient,
    retrieval::RetrievalService,
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Build the shared state from configuration
///
/// No catalog file is read here; the first retrieval loads it.
pub fn build_state(config: &Config) -> Result<AppState> {
    tracing::info!(
        "📚 Template catalog: {} / {} (policy: {:?})",
        config.catalog.index_path.display(),
        config.catalog.embeddings_path.display(),
        config.catalog.policy
    );
    let store = JsonTemplateStore::new(&config.catalog.index_path, &config.catalog.embeddings_path);
    let catalog = Arc::new(TemplateCatalog::new(Arc::new(store), config.catalog.policy));

    tracing::info!("🧮 Initializing embedding provider ({})", config.embedding.model);
    let embedder = HttpEmbeddingProvider::new(&config.embedding)
        .map_err(|e| anyhow::anyhow!("Failed to initialize embedding provider: {}", e))?;
    if config.embedding.api_key.is_none() {
        tracing::warn!("⚠️ No embedding API key configured, retrieval requests will fail");
    }

    let retrieval = RetrievalService::new(catalog, Arc::new(embedder))
        .with_default_top_k(config.catalog.default_top_k);

    tracing::info!("🤖 Initializing generation client ({})", config.generation.model);
    let generator = OpenAiClient::new(&config.generation)?;
    let deployer = N8nClient::new(config.n8n.clone())?;

    Ok(AppState {
        retrieval: Arc::new(retrieval),
        generator: Arc::new(generator),
        deployer: Arc::new(deployer),
    })
}

/// Create the router for an already-built state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        .merge(create_chat_routes())
        .merge(create_workflow_routes())
        .merge(create_template_routes())
        .with_state(state)
}

/// Create the main Axum application with all routes
pub fn create_app(config: &Config) -> Result<Router> {
    let state = build_state(config)?;
    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = create_router(state);
    tracing::info!("✅ Application initialized successfully");
    Ok(app)
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    tracing::info!("Starting flowdraft server...");

    let app = create_app(&config)?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}

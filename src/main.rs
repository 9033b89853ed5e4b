/// flowdraft: template-grounded n8n workflow drafting
///
/// Runs the HTTP server by default. The offline jobs that build the template and
/// embedding catalogs are subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use flowdraft::{
    catalog::JsonTemplateStore,
    config::Config,
    embedding::HttpEmbeddingProvider,
    generation::OpenAiClient,
    ingest,
    server::start_server,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowdraft", version, about = "Template-grounded n8n workflow drafting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Scan category folders of workflow exports into the template catalog
    Index {
        /// Directory holding one folder per category
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Compute an embedding for every template
    Embed {
        /// Pause between embedding calls
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
    /// Fill in missing descriptions and tags
    Annotate {
        /// Pause between model calls
        #[arg(long, default_value_t = 1200)]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut config = Config::default();
    let store = JsonTemplateStore::new(&config.catalog.index_path, &config.catalog.embeddings_path);

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            start_server(config).await?;
        }
        Command::Index { root } => {
            let count = ingest::index::run(&root, store.index_path()).await?;
            tracing::info!("✅ Indexed {} templates into {}", count, store.index_path().display());
        }
        Command::Embed { delay_ms } => {
            let provider = HttpEmbeddingProvider::new(&config.embedding)?;
            let report =
                ingest::embed::run(&store, &provider, Duration::from_millis(delay_ms)).await?;
            tracing::info!(
                "✅ Embedded {} templates ({} skipped) into {}",
                report.embedded,
                report.skipped,
                store.embeddings_path().display()
            );
        }
        Command::Annotate { delay_ms } => {
            let client = OpenAiClient::new(&config.generation)?;
            let updated =
                ingest::annotate::run(&store, &client, Duration::from_millis(delay_ms)).await?;
            tracing::info!("✅ Annotated {} templates", updated);
        }
    }

    Ok(())
}

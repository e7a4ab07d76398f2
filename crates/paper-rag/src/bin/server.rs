//! Paper RAG server binary
//!
//! Run with: cargo run -p paper-rag --bin paper-rag-server

use std::path::PathBuf;

use paper_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paper_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                     Paper RAG System                      ║
║          Question Answering over Research Papers          ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration (optional config file path as first argument)
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!(
        "  - Embedding model: {} ({} dimensions)",
        config.embedding.model,
        config.embedding.dimensions
    );
    tracing::info!("  - Generation model: {}", config.generation.model);
    tracing::info!(
        "  - Chunk size: {} (overlap: {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Index backend: {:?}", config.index.backend);

    if config.embedding.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set");
        tracing::warn!("The server will not start without it:");
        tracing::warn!("  export GEMINI_API_KEY=your-key");
    }

    // Create and start server
    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/index - Chunk, embed, and store a document");
    println!("  POST /api/query - Ask a question about indexed documents");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

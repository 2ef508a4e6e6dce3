mod book;
mod config;
mod errors;
mod generation;
mod llm_client;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::BookStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Chasse API v{}", env!("CARGO_PKG_VERSION"));

    let llm: Option<Arc<dyn TextGenerator>> = match config.llm_settings() {
        Some(settings) => {
            let client = LlmClient::new(settings)?;
            info!("LLM client initialized (model: {})", client.settings().model);
            Some(Arc::new(client))
        }
        None => {
            warn!("OPENAI_API_KEY is not set; generation endpoints will answer 503");
            None
        }
    };

    let store = BookStore::new(&config.output_dir);
    info!("Books are stored under {}", store.root().display());

    let state = AppState {
        llm,
        store,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

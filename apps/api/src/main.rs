mod config;
mod errors;
mod ingest;
mod llm_client;
mod models;
mod optimization;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::optimization::rewriter::{LlmParaphraser, Paraphraser};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS Optimizer v{}", env!("CARGO_PKG_VERSION"));

    // Paraphrase backend (optional). The HTTP client is built on first use.
    let paraphraser: Option<Arc<dyn Paraphraser>> = match &config.anthropic_api_key {
        Some(key) => {
            info!(
                "Paraphraser enabled (model: {}, timeout: {}s)",
                llm_client::MODEL,
                config.paraphrase_timeout_secs
            );
            Some(Arc::new(LlmParaphraser::new(key.clone())))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; experience rewriting is disabled");
            None
        }
    };

    info!(
        "Keyword extraction: top {} terms, default skills '{}'",
        config.top_n_keywords, config.default_skills
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        paraphraser,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the front-end origin once it is deployed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

mod bundle;
mod config;
mod errors;
mod llm_client;
mod render;
mod routes;
mod state;
mod tailoring;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::render::CommandRenderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tailoring::pipeline::PipelineSettings;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client. Without a key the server still answers /health,
    // and every tailoring request fails fast.
    let generator: Option<Arc<dyn TextGenerator>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.llm_model.clone())?;
            info!("LLM client initialized (model: {})", llm.model());
            Some(Arc::new(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY is not set; tailoring requests will be rejected");
            None
        }
    };

    let renderer = CommandRenderer::from_config(&config.render);
    info!(
        "Renderer: {} (fallback: {} -m rendercv.cli.entry_point), timeout {}s",
        config.render.rendercv_bin,
        config.render.python_bin,
        config.render.timeout.as_secs()
    );

    let settings = PipelineSettings::from_config(&config);
    info!(
        "Templates {} / {} searched in {:?}",
        settings.cv_template, settings.cover_letter_template, settings.template_dirs
    );

    // Build app state
    let state = AppState {
        generator,
        renderer: Arc::new(renderer),
        settings,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

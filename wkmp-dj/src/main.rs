//! wkmp-dj - Conversational DJ service
//!
//! Serves the HTTP API on the configured port. Runs with no config file at
//! all; missing Spotify or language-model credentials only disable the
//! features that need them.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use wkmp_common::logging::init_tracing;
use wkmp_dj::catalog::{Catalog, SpotifyClient};
use wkmp_dj::config::{DjConfig, CONFIG_ENV_VAR};
use wkmp_dj::dispatcher::Dispatcher;
use wkmp_dj::llm::AnthropicClient;
use wkmp_dj::playback::SonosClient;
use wkmp_dj::registry::CandidateRegistry;
use wkmp_dj::resolver::IntentResolver;
use wkmp_dj::{build_router, AppState, DjService};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "wkmp-dj")]
#[command(about = "Conversational DJ for a Sonos zone")]
#[command(version)]
struct Args {
    /// Path to dj.toml
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides [server].port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        DjConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config.log_directive());

    info!(
        "Starting WKMP DJ (wkmp-dj) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!(
        "Config: server {}:{}, Sonos {} room '{}'",
        config.server.host, config.server.port, config.sonos.base_url, config.sonos.room
    );

    let playback =
        Arc::new(SonosClient::new(&config.sonos).context("Failed to create Sonos client")?);
    info!("Sonos zone: {}", playback.zone_url());

    let catalog: Option<Arc<dyn Catalog>> = match SpotifyClient::new(&config.spotify) {
        Ok(client) => {
            info!("✓ Spotify catalog configured");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("Spotify catalog unavailable: {}", e);
            None
        }
    };

    let resolver = match config.llm_api_key() {
        Some(key) => {
            let client = AnthropicClient::new(key, &config.llm)
                .context("Failed to create language model client")?;
            info!("✓ Natural language enabled (model {})", config.llm.model);
            Some(IntentResolver::new(Arc::new(client), config.llm.timeout()))
        }
        None => {
            warn!("No language model API key; /chat will ask for direct commands");
            None
        }
    };

    let dispatcher = Dispatcher::new(
        CandidateRegistry::new(),
        catalog,
        playback,
        config.spotify.search_limit,
    );
    let state = AppState::new(DjService::new(dispatcher, resolver));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("wkmp-dj listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

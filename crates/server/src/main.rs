use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackercache_core::{
    load_config, validate_config, CacheStore, Indexer, JackettIndexer, LiveSettings,
    ResultsService, CONFIG_PATH_ENV,
};
use trackercache_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );
    info!(
        enabled = config.cache.enabled,
        ttl_secs = config.cache.ttl_secs,
        max_results_per_indexer = config.cache.max_results_per_indexer,
        "Result cache settings"
    );

    // Live settings shared by the cache and the outbound clients
    let settings = Arc::new(LiveSettings::from_config(&config));
    let cache = Arc::new(CacheStore::new(settings.clone()));

    // Create indexers
    let mut indexers: Vec<Arc<dyn Indexer>> = Vec::new();
    match &config.upstream {
        Some(upstream) => {
            info!("Initializing {} indexer(s) via {}", config.indexers.len(), upstream.url);
            for indexer_config in &config.indexers {
                let indexer = JackettIndexer::from_config(indexer_config, upstream, settings.clone())
                    .with_context(|| format!("Failed to create indexer {}", indexer_config.id))?;
                indexers.push(Arc::new(indexer));
            }
        }
        None => warn!("No upstream configured, search is unavailable"),
    }

    let service = Arc::new(ResultsService::new(cache, indexers));

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), settings, service));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

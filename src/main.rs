//! Waypost
//!
//! Entry point: loads configuration, wires the auth gate and store
//! bindings, and serves the router until shutdown.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypost::auth::{AuthGate, JwksFetcher};
use waypost::blob::{BlobStore, HttpBlobStore};
use waypost::config::Config;
use waypost::routes::{self, AppState};
use waypost::store::{LinkStore, RedisKvStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waypost=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Waypost");

    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        bind_address = %config.bind_address,
        jwks_url = %config.jwks_url,
        blob_store_url = %config.blob_store_url,
        link_store_bound = config.redis_url.is_some(),
        "Configuration loaded successfully"
    );

    // Optional key-value binding: without it the short-link endpoints
    // respond 503 while public blob reads keep working.
    let links = match &config.redis_url {
        Some(url) => {
            let kv = RedisKvStore::connect(url)
                .await
                .context("Failed to connect to key-value store")?;
            Some(LinkStore::new(Arc::new(kv)))
        }
        None => {
            warn!("REDIS_URL not set; short-link endpoints will respond 503");
            None
        }
    };

    let auth = AuthGate::new(
        JwksFetcher::new(config.jwks_url.clone()),
        config.jwt_issuer.clone(),
        config.jwt_audience.clone(),
    );

    let blobs: Arc<dyn BlobStore> = Arc::new(HttpBlobStore::new(config.blob_store_url.clone()));

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    let state = Arc::new(AppState {
        config,
        auth,
        links,
        blobs,
    });

    let app = routes::build_routes(state);

    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("Invalid bind address: {bind_address}"))?;

    info!("Waypost listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Waypost shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

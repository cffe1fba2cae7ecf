mod config;

use std::sync::Arc;

use chirpy_api::metrics::Metrics;
use chirpy_api::{AppState, AppStateInner, TokenService, router};
use chirpy_crypto::Credentials;
use chirpy_db::Store;
use tracing::{error, info};

use crate::config::Config;

/// Passes used when only the memory cost is overridden.
const ARGON2_PASSES: u32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let credentials = match config.hash_memory_kib {
        Some(kib) => Credentials::with_cost(kib, ARGON2_PASSES)?,
        None => Credentials::default(),
    };

    // A snapshot that cannot be read is fatal here.
    let store = Store::open_with(&config.db_path, credentials)?;

    let state: AppState = Arc::new(AppStateInner {
        store,
        tokens: TokenService::default(),
        polka_key: config.polka_key.clone(),
        metrics: Metrics::default(),
        request_timeout: config.request_timeout,
    });

    let app = router(state.clone(), &config.public_dir);

    info!("Chirpy server listening on {}", config.addr);
    if config.debug {
        info!("Debug mode: the store will be wiped on shutdown");
    }

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if config.debug {
        if let Err(e) = state.store.reset() {
            error!("[debug mode] Failed to reset store: {}", e);
            return Err(e.into());
        }
        info!("[debug mode] Store reset");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

// src/main.rs
use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use fixture_server::config::{self, FixtureConfig};
use fixture_server::FixtureServer;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config file
    let config = match std::env::args().nth(1) {
        Some(path) => config::load_config(&path)
            .await
            .with_context(|| format!("loading configuration from {path}"))?,
        None => FixtureConfig::default(),
    };

    // RUST_LOG, when set, wins over the configured filter.
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(config.log_filter())
            .with_context(|| format!("invalid log_filter {:?}", config.log_filter()))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let mut server = FixtureServer::bind(config.port)?;
    server.start()?;
    info!("Fixture pages available under {}", server.url());

    shutdown_signal().await;

    // Joining the server thread blocks.
    tokio::task::spawn_blocking(move || server.shutdown()).await??;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}

use std::sync::Arc;

use adiwiyata_core::clock::SystemClock;
use adiwiyata_server::config;
use adiwiyata_server::state::{AppState, build_completion, build_store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init_tracing();

    let config = config::load()?;
    tracing::info!(config = ?config::config_info(&config), "configuration");

    let store = build_store(&config.store)?;
    let completion = build_completion(&config)?;
    let state = AppState::new(store, completion, Arc::new(SystemClock), &config)?;

    let app = adiwiyata_server::router(state.clone());
    let sweeper = state.spawn_session_sweeper();

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|e| eyre::eyre!("failed to bind {}: {e}", config.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    state.shutdown();
    tracing::info!("server stopped");
    Ok(())
}

/// Plain text logs by default; JSON lines with `ADIWIYATA_LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("ADIWIYATA_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

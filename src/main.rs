use health_ledger::{
    clock::SystemClock, router, state::SharedStore, AppConfig, AppState, FileStore, LedgerService,
    StorageKey,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    let key = match &config.user_id {
        Some(user) => StorageKey::for_user(user.clone()),
        None => StorageKey::global(),
    };
    let store: SharedStore = Arc::new(FileStore::new(config.data_dir.clone()));
    let state = AppState::new(LedgerService::new(store, key), Arc::new(SystemClock));

    {
        let ledger = state.ledger.lock().await;
        info!(
            week_start = %ledger.window.week_start,
            data_dir = %config.data_dir.display(),
            "weekly ledger loaded"
        );
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

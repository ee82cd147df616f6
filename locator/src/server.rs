//! axumサーバー起動・シャットダウンハンドリング

use std::io;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::shutdown::ShutdownController;
use crate::sweeper::StaleAgentSweeper;
use crate::AppState;

/// Binds `bind_addr` and serves until a shutdown signal arrives.
pub async fn run(state: AppState, bind_addr: &str) -> io::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    serve(state, listener).await
}

/// Serves on an already bound listener.
///
/// Starts the stale sweeper when eviction is enabled, and closes the location
/// index once the server has drained.
pub async fn serve(state: AppState, listener: TcpListener) -> io::Result<()> {
    let shutdown = state.shutdown.clone();
    let index = state.index.clone();

    let sweeper = if state.config.eviction_enabled() {
        let handle = StaleAgentSweeper::new(
            index.clone(),
            Duration::from_secs(state.config.stale_after_secs),
        )
        .with_interval(Duration::from_secs(state.config.sweep_interval_secs))
        .start(shutdown.clone());
        Some(handle)
    } else {
        None
    };

    let app = crate::api::create_router(state);

    info!(
        "Driver Locator server listening on {}",
        listener.local_addr()?
    );

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await;

    // Background tasks listen on the same controller.
    shutdown.request_shutdown();
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            error!(error = %e, "Stale agent sweeper task failed");
        }
    }

    match index.len().await {
        Ok(agents) => info!(agents, "Discarding in-memory locations"),
        Err(e) => error!(error = %e, "Location index unavailable at shutdown"),
    }
    index.close().await;

    info!("Server shutdown complete");
    result
}

/// シャットダウンシグナルを待機
async fn shutdown_signal(shutdown: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = shutdown.wait() => {
            info!("Shutdown requested, shutting down...");
        }
    }
}

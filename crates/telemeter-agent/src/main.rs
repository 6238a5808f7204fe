//! telemeter agent
//!
//! Loads `telemeter.yaml` (or the path given as the first argument), builds
//! the registry with its collectors and storages, and serves the ops
//! endpoints until SIGINT/SIGTERM.

use tracing_subscriber::{fmt, EnvFilter};

use telemeter_agent::{app_state::AppState, config, router};
use telemeter_core::{Result, TelemeterError};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "telemeter-agent failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "telemeter.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.http.listen_addr()?;

    let state = AppState::new(&cfg).await?;
    let registry = state.registry().clone();
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "telemeter-agent starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| TelemeterError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TelemeterError::Internal(format!("server failed: {e}")))?;

    // Flush one last batch so nothing recorded since the last tick is lost.
    registry.set_send_interval(std::time::Duration::ZERO)?;
    if let Err(e) = registry.gather_and_send().await {
        tracing::warn!(error = %e, "final send failed");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}

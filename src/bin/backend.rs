use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};
use ytinfo::{
    config::load_runtime_config,
    extractor::YtDlp,
    server::{AppState, router},
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = load_runtime_config().context("loading configuration")?;
    let extractor = YtDlp::from_config(&config);
    let app = router(AppState::new(Arc::new(extractor)));

    let addr = SocketAddr::new(
        config
            .host
            .parse()
            .with_context(|| format!("parsing host {}", config.host))?,
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    info!(%addr, ytdlp = %config.ytdlp_path, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running API server")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

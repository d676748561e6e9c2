//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the metrics recorder when enabled
//! - Build the server from the validated configuration
//! - Bind the listener last, so traffic arrives only when ready
//!
//! Any startup error is fatal.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid address {0:?}")]
    Address(String),
    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the proxy until SIGINT/SIGTERM.
pub async fn start(config: ProxyConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, receiver).await?;
    Ok(())
}

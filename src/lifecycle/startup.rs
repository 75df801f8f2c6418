//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the trust instance (fatal on bad CIDRs)
//! - Start the metrics exporter
//! - Bind the listener and serve until a signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_signal;
use crate::observability::metrics;
use crate::trust::{EdgeTrust, TrustError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("trust configuration: {0}")]
    Trust(#[from] TrustError),

    #[error("upstream address: {0}")]
    Upstream(#[from] axum::http::uri::InvalidUri),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the proxy until SIGINT/SIGTERM.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    let trust = Arc::new(EdgeTrust::from_config(&config.trust).await?);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(&config, trust)?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        upstream = %config.upstream.address,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let serve = tokio::spawn(server.run(listener, server_shutdown));

    wait_for_signal().await;
    shutdown.trigger();

    match serve.await {
        Ok(result) => result?,
        Err(e) => tracing::error!(error = %e, "Server task failed"),
    }
    Ok(())
}

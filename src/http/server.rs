//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: edge trust middleware in front of the forwarder
//! - Wire up middleware (tracing, timeout)
//! - Serve with connect info so the middleware sees the peer socket
//! - Stop the trust refresher once the server has drained

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::uri::Authority, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::forward::{forward_handler, Upstream};
use crate::http::middleware::edge_trust_middleware;
use crate::trust::EdgeTrust;

/// HTTP server for the edge-trust proxy.
pub struct HttpServer {
    router: Router,
    trust: Arc<EdgeTrust>,
}

impl HttpServer {
    /// Create a server forwarding to `config.upstream`.
    pub fn new(config: &ProxyConfig, trust: Arc<EdgeTrust>) -> Result<Self, axum::http::uri::InvalidUri> {
        let authority: Authority = config.upstream.address.parse()?;
        let router = Self::build_router(config, Upstream::new(authority), trust.clone());
        Ok(Self { router, trust })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, upstream: Upstream, trust: Arc<EdgeTrust>) -> Router {
        Router::new()
            .fallback(forward_handler)
            .with_state(upstream)
            .layer(middleware::from_fn_with_state(trust, edge_trust_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for embedding or testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then stop the trust refresher.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, instance = %self.trust.name(), "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        self.trust.stop().await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

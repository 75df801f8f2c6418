//! Edge trust reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌────────────────────────────────────────────────┐
//!                 │                EDGE TRUST PROXY                │
//!   Client /      │  ┌──────────┐   ┌──────────────┐   ┌────────┐  │
//!   CDN edge  ────┼─▶│  server  │──▶│  edge_trust  │──▶│forward │──┼──▶ Upstream
//!                 │  └──────────┘   │  middleware  │   └────────┘  │
//!                 │                 └──────┬───────┘               │
//!                 │                        │ evaluate / rewrite    │
//!                 │                 ┌──────▼───────┐               │
//!                 │                 │ trust engine │◀── refresher  │
//!                 │                 │ trusted set  │    (DNS)      │
//!                 │                 └──────────────┘               │
//!                 └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_trust_proxy::config::{load_config, ProxyConfig};
use edge_trust_proxy::lifecycle;
use edge_trust_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "edge-trust-proxy")]
#[command(
    about = "Reverse proxy that only honours client identity headers from trusted edge networks",
    long_about = None
)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("edge-trust-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        dns_source = config.trust.dns_name().unwrap_or("-"),
        disable_default = config.trust.disable_default,
        "Configuration loaded"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Trust decision engine.
//!
//! # Responsibilities
//! - Own the trusted set, the cluster set and (for DNS sources) the refresher
//! - Classify a peer address as Fatal / AddressError / Trusted / Untrusted
//!
//! # Decision Order
//! ```text
//! "host:port" split fails        → Fatal
//! host is not an IP              → AddressError
//! trusted set contains peer      → Trusted
//! edge marker + peer in cluster  → one forced refresh, re-check once
//! otherwise                      → Untrusted
//! ```
//!
//! # Design Decisions
//! - The forced refresh is bounded: at most one per request, never looped
//! - Without a DNS source there is nothing to refresh, so the cluster
//!   fallback is skipped entirely

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::TrustConfig;
use crate::observability::metrics;
use crate::trust::defaults::{CLOUDFLARE_RANGES, CLOUDFLARE_RANGES_VERSION};
use crate::trust::error::TrustError;
use crate::trust::networks::{NetworkSet, TrustedNetworks};
use crate::trust::refresh::{refresh_once, RefreshScheduler, RefreshTrigger};
use crate::trust::resolver::{resolve_static, DnsSource, HostResolver, SystemResolver};

/// Classification of a single request's peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustOutcome {
    /// The peer string is not `host:port`.
    Fatal,
    /// The host is not an IP address.
    AddressError,
    Trusted,
    Untrusted,
}

impl TrustOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustOutcome::Fatal => "fatal",
            TrustOutcome::AddressError => "address_error",
            TrustOutcome::Trusted => "trusted",
            TrustOutcome::Untrusted => "untrusted",
        }
    }
}

/// Result of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustDecision {
    pub outcome: TrustOutcome,
    /// Parsed peer address, present for Trusted and Untrusted.
    pub peer: Option<IpAddr>,
    /// Peer string as received from the connection layer.
    pub raw: String,
}

impl TrustDecision {
    fn new(outcome: TrustOutcome, peer: Option<IpAddr>, raw: &str) -> Self {
        Self {
            outcome,
            peer,
            raw: raw.to_string(),
        }
    }

    pub fn is_trusted(&self) -> bool {
        self.outcome == TrustOutcome::Trusted
    }

    /// The observed peer address rendered as text.
    pub fn direct_ip(&self) -> Option<String> {
        self.peer.map(|ip| ip.to_string())
    }
}

/// Split `host:port` the way a connection layer renders peers:
/// `1.2.3.4:80`, `[::1]:80`. Bare IPv6 without brackets is rejected.
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        let port = after.strip_prefix(':')?;
        if host.contains(['[', ']']) || port.contains([':', '[', ']']) {
            return None;
        }
        return Some((host, port));
    }

    let (host, port) = addr.rsplit_once(':')?;
    if host.contains([':', '[', ']']) || port.contains(['[', ']']) {
        return None;
    }
    Some((host, port))
}

/// A configured trust evaluator. One per middleware instance.
pub struct EdgeTrust {
    name: String,
    trusted: Arc<TrustedNetworks>,
    cluster: NetworkSet,
    refresher: Option<RefreshScheduler>,
    debug: bool,
}

impl EdgeTrust {
    /// Build from config with the built-in defaults and the system resolver.
    pub async fn from_config(config: &TrustConfig) -> Result<Self, TrustError> {
        if !config.disable_default {
            tracing::info!(
                instance = %config.name,
                version = CLOUDFLARE_RANGES_VERSION,
                ranges = CLOUDFLARE_RANGES.len(),
                "Using built-in edge ranges"
            );
        }
        Self::new(config, CLOUDFLARE_RANGES, Arc::new(SystemResolver)).await
    }

    /// Build an instance. Any malformed CIDR aborts construction.
    ///
    /// With a DNS name configured the name is resolved once before
    /// returning and a refresh scheduler is started; this needs a Tokio
    /// runtime.
    pub async fn new(
        config: &TrustConfig,
        defaults: &[&str],
        resolver: Arc<dyn HostResolver>,
    ) -> Result<Self, TrustError> {
        let static_set = resolve_static(&config.trusted_cidrs, defaults, config.disable_default)?;
        let cluster = NetworkSet::parse(&config.cluster_cidrs)?;

        let (trusted, refresher) = match config.dns_name() {
            Some(dns_name) => {
                if !static_set.is_empty() {
                    tracing::info!(
                        instance = %config.name,
                        dns_name,
                        superseded = static_set.len(),
                        "DNS trust source configured, static networks ignored"
                    );
                }
                let source = DnsSource::new(
                    dns_name,
                    resolver,
                    Duration::from_secs(config.dns_timeout_secs),
                );
                let trusted = Arc::new(TrustedNetworks::new(NetworkSet::default()));
                refresh_once(&source, &trusted, RefreshTrigger::Initial).await;
                let refresher = RefreshScheduler::start(
                    source,
                    trusted.clone(),
                    Duration::from_secs(config.refresh_interval_secs),
                );
                (trusted, Some(refresher))
            }
            None => {
                metrics::record_trusted_networks(static_set.len());
                (Arc::new(TrustedNetworks::new(static_set)), None)
            }
        };

        tracing::info!(
            instance = %config.name,
            trusted = trusted.len(),
            cluster = cluster.len(),
            dynamic = refresher.is_some(),
            "Edge trust initialized"
        );

        Ok(Self {
            name: config.name.clone(),
            trusted,
            cluster,
            refresher,
            debug: config.debug,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Whether the trusted set follows a DNS name.
    pub fn is_dynamic(&self) -> bool {
        self.refresher.is_some()
    }

    /// Snapshot of the current trusted set.
    pub fn trusted_networks(&self) -> Arc<NetworkSet> {
        self.trusted.snapshot()
    }

    /// Classify the peer of one request.
    pub async fn evaluate(&self, peer: &str, has_edge_marker: bool) -> TrustDecision {
        let decision = self.decide(peer, has_edge_marker).await;
        metrics::record_decision(decision.outcome.as_str());
        decision
    }

    async fn decide(&self, peer: &str, has_edge_marker: bool) -> TrustDecision {
        let Some((host, _port)) = split_host_port(peer) else {
            return TrustDecision::new(TrustOutcome::Fatal, None, peer);
        };
        let ip = match host.parse::<IpAddr>() {
            Ok(ip) => ip.to_canonical(),
            Err(_) => return TrustDecision::new(TrustOutcome::AddressError, None, peer),
        };

        if self.trusted.contains(&ip) {
            return TrustDecision::new(TrustOutcome::Trusted, Some(ip), peer);
        }

        if has_edge_marker && self.cluster.contains(&ip) {
            if let Some(refresher) = &self.refresher {
                tracing::debug!(
                    instance = %self.name,
                    peer = %ip,
                    "Cluster peer with edge marker missed, forcing refresh"
                );
                refresher.force_refresh().await;
                if self.trusted.contains(&ip) {
                    return TrustDecision::new(TrustOutcome::Trusted, Some(ip), peer);
                }
            }
        }

        TrustDecision::new(TrustOutcome::Untrusted, Some(ip), peer)
    }

    /// Stop background refreshing. Safe to call more than once.
    pub async fn stop(&self) {
        if let Some(refresher) = &self.refresher {
            refresher.stop().await;
        }
    }
}

impl std::fmt::Debug for EdgeTrust {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeTrust")
            .field("name", &self.name)
            .field("trusted", &self.trusted.len())
            .field("cluster", &self.cluster.len())
            .field("dynamic", &self.is_dynamic())
            .field("debug", &self.debug)
            .finish()
    }
}

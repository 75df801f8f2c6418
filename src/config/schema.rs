//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge-trust proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream that receives every request after header rewriting.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Trusted edge network settings.
    pub trust: TrustConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream (next handler) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Trusted edge network configuration.
///
/// Field aliases accept the camel-cased keys used by existing plugin configs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Instance name, used to tag log events.
    pub name: String,

    /// Explicitly trusted networks in CIDR notation.
    #[serde(alias = "trustip")]
    pub trusted_cidrs: Vec<String>,

    /// Do not append the built-in edge provider ranges.
    #[serde(alias = "disableDefault")]
    pub disable_default: bool,

    /// DNS name whose addresses form the trusted set. Supersedes the
    /// static list entirely when non-empty.
    #[serde(alias = "trustDnsName")]
    pub trust_dns_name: String,

    /// Networks of the proxy's own cluster. A miss from one of these with an
    /// edge marker triggers one forced refresh.
    #[serde(alias = "clusterCIDR")]
    pub cluster_cidrs: Vec<String>,

    /// Verbose per-request diagnostics.
    pub debug: bool,

    /// Period of the DNS refresh timer in seconds.
    pub refresh_interval_secs: u64,

    /// Upper bound for a single DNS lookup in seconds.
    pub dns_timeout_secs: u64,
}

impl TrustConfig {
    /// Returns the DNS trust source, if one is configured.
    pub fn dns_name(&self) -> Option<&str> {
        let name = self.trust_dns_name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            name: "edge-trust".to_string(),
            trusted_cidrs: Vec::new(),
            disable_default: false,
            trust_dns_name: String::new(),
            cluster_cidrs: Vec::new(),
            debug: false,
            refresh_interval_secs: 60,
            dns_timeout_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

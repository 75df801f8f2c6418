//! Trust source resolution.
//!
//! # Responsibilities
//! - Build the static trusted set (configured list + built-in defaults)
//! - Resolve a DNS name into singleton networks
//!
//! # Design Decisions
//! - A DNS source replaces the static list, never merges with it
//! - Lookup failure or timeout yields an EMPTY set (fail closed): a DNS
//!   outage revokes trust instead of keeping stale entries
//! - The lookup itself sits behind `HostResolver` so tests can script it

use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::time;

use crate::trust::error::TrustError;
use crate::trust::networks::NetworkSet;

/// Name-to-address lookup.
pub trait HostResolver: Send + Sync {
    fn lookup<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>>;
}

/// Resolver backed by the operating system (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn lookup<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
        async move {
            let addrs = tokio::net::lookup_host((name, 0)).await?;
            Ok(addrs.map(|addr| addr.ip()).collect())
        }
        .boxed()
    }
}

/// Configured list followed by the defaults, unless they are disabled.
pub fn resolve_static<S: AsRef<str>>(
    configured: &[S],
    defaults: &[&str],
    disable_defaults: bool,
) -> Result<NetworkSet, TrustError> {
    let mut set = NetworkSet::parse(configured)?;
    if !disable_defaults {
        set.extend(NetworkSet::parse(defaults)?);
    }
    Ok(set)
}

/// A DNS name whose current addresses are the trusted set.
#[derive(Clone)]
pub struct DnsSource {
    name: String,
    resolver: Arc<dyn HostResolver>,
    timeout: Duration,
}

impl DnsSource {
    pub fn new(name: impl Into<String>, resolver: Arc<dyn HostResolver>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            resolver,
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the name. Never fails: errors produce an empty set.
    pub async fn resolve(&self) -> NetworkSet {
        match time::timeout(self.timeout, self.resolver.lookup(&self.name)).await {
            Ok(Ok(addrs)) => {
                let mut unique: Vec<IpAddr> = Vec::with_capacity(addrs.len());
                for addr in addrs {
                    let addr = addr.to_canonical();
                    if !unique.contains(&addr) {
                        unique.push(addr);
                    }
                }
                NetworkSet::from_hosts(unique)
            }
            Ok(Err(e)) => {
                tracing::warn!(dns_name = %self.name, error = %e, "Trust DNS lookup failed, revoking trust");
                NetworkSet::default()
            }
            Err(_) => {
                tracing::warn!(
                    dns_name = %self.name,
                    timeout = ?self.timeout,
                    "Trust DNS lookup timed out, revoking trust"
                );
                NetworkSet::default()
            }
        }
    }
}

impl std::fmt::Debug for DnsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsSource")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(io::Result<Vec<IpAddr>>);

    impl HostResolver for Scripted {
        fn lookup<'a>(&'a self, _name: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
            let result = match &self.0 {
                Ok(addrs) => Ok(addrs.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            };
            async move { result }.boxed()
        }
    }

    struct Hang;

    impl HostResolver for Hang {
        fn lookup<'a>(&'a self, _name: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
            futures_util::future::pending().boxed()
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_static_appends_defaults() {
        let set = resolve_static(&["10.0.0.0/8"], &["192.0.2.0/24"], false).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&ip("10.1.1.1")));
        assert!(set.contains(&ip("192.0.2.1")));
    }

    #[test]
    fn test_static_without_defaults() {
        let set = resolve_static(&["10.0.0.0/8"], &["192.0.2.0/24"], true).unwrap();
        assert_eq!(set.len(), 1);
        assert!(!set.contains(&ip("192.0.2.1")));
    }

    #[test]
    fn test_static_invalid_is_error() {
        let configured = vec!["10.0.0.0/8".to_string(), "bogus".to_string()];
        assert!(resolve_static(&configured, &[], true).is_err());
    }

    #[tokio::test]
    async fn test_dns_addresses_become_singletons() {
        let resolver = Arc::new(Scripted(Ok(vec![
            ip("192.0.2.1"),
            ip("2001:db8::1"),
            ip("192.0.2.1"),
        ])));
        let source = DnsSource::new("edge.test", resolver, Duration::from_secs(1));

        let set = source.resolve().await;
        assert_eq!(set.len(), 2);
        assert!(set.contains(&ip("192.0.2.1")));
        assert!(!set.contains(&ip("192.0.2.2")));
        assert!(set.contains(&ip("2001:db8::1")));
    }

    #[tokio::test]
    async fn test_dns_failure_fails_closed() {
        let resolver = Arc::new(Scripted(Err(io::Error::new(
            io::ErrorKind::NotFound,
            "no such host",
        ))));
        let source = DnsSource::new("edge.test", resolver, Duration::from_secs(1));
        assert!(source.resolve().await.is_empty());
    }

    #[tokio::test]
    async fn test_dns_timeout_fails_closed() {
        let source = DnsSource::new("edge.test", Arc::new(Hang), Duration::from_millis(20));
        assert!(source.resolve().await.is_empty());
    }
}

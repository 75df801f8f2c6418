//! Ordered network prefix sets.
//!
//! # Responsibilities
//! - Parse CIDR strings into an ordered `NetworkSet`
//! - Answer "contains address" queries (first match wins)
//! - Hold the live trusted set behind an atomically swappable pointer
//!
//! # Design Decisions
//! - A `NetworkSet` is immutable; a refresh builds a new one and swaps it in
//! - Readers never lock: `ArcSwap::load` hands out a full snapshot
//! - IPv4-mapped IPv6 addresses are matched as their IPv4 form

use std::net::IpAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use ipnet::IpNet;

use crate::trust::error::TrustError;

/// An ordered collection of network prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSet {
    networks: Vec<IpNet>,
}

impl NetworkSet {
    pub fn new(networks: Vec<IpNet>) -> Self {
        Self { networks }
    }

    /// Parse every entry; the first malformed entry aborts.
    pub fn parse<I, S>(cidrs: I) -> Result<Self, TrustError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let networks = cidrs
            .into_iter()
            .map(|cidr| {
                let cidr = cidr.as_ref();
                cidr.trim()
                    .parse::<IpNet>()
                    .map_err(|e| TrustError::InvalidCidr {
                        value: cidr.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { networks })
    }

    /// One full-length network per address (/32 or /128).
    pub fn from_hosts<I: IntoIterator<Item = IpAddr>>(addrs: I) -> Self {
        Self {
            networks: addrs.into_iter().map(IpNet::from).collect(),
        }
    }

    pub fn contains(&self, addr: &IpAddr) -> bool {
        let addr = addr.to_canonical();
        self.networks.iter().any(|net| net.contains(&addr))
    }

    pub fn extend(&mut self, other: NetworkSet) {
        self.networks.extend(other.networks);
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IpNet> {
        self.networks.iter()
    }
}

/// The live trusted set, replaced wholesale on refresh.
#[derive(Debug)]
pub struct TrustedNetworks {
    current: ArcSwap<NetworkSet>,
}

impl TrustedNetworks {
    pub fn new(initial: NetworkSet) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Check an address against the current snapshot.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.current.load().contains(addr)
    }

    /// Atomically substitute the whole collection.
    pub fn replace(&self, networks: NetworkSet) {
        self.current.store(Arc::new(networks));
    }

    /// Snapshot of the current collection.
    pub fn snapshot(&self) -> Arc<NetworkSet> {
        self.current.load_full()
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

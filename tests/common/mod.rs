//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use axum::{body::Body, http::HeaderMap, http::Request, Json, Router};
use edge_trust_proxy::config::TrustConfig;
use edge_trust_proxy::trust::HostResolver;
use futures_util::future::{BoxFuture, FutureExt};
use tokio::net::TcpListener;

/// A resolver whose answer is set by the test.
#[derive(Default)]
pub struct MockResolver {
    answer: Mutex<Option<Vec<IpAddr>>>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn answering(addrs: &[&str]) -> Self {
        let resolver = Self::default();
        resolver.set(addrs);
        resolver
    }

    pub fn set(&self, addrs: &[&str]) {
        let addrs = addrs.iter().map(|a| a.parse().unwrap()).collect();
        *self.answer.lock().unwrap() = Some(addrs);
    }

    /// Every following lookup fails.
    pub fn fail(&self) {
        *self.answer.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HostResolver for MockResolver {
    fn lookup<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.answer.lock().unwrap().clone() {
            Some(addrs) => Ok(addrs),
            None => Err(io::Error::new(io::ErrorKind::NotFound, format!("no such host: {}", name))),
        };
        async move { result }.boxed()
    }
}

/// Trust config with only the given networks (defaults disabled).
pub fn static_trust(trusted: &[&str]) -> TrustConfig {
    TrustConfig {
        trusted_cidrs: trusted.iter().map(|s| s.to_string()).collect(),
        disable_default: true,
        ..TrustConfig::default()
    }
}

/// Trust config following a DNS name, with a cluster range.
pub fn dns_trust(cluster: &[&str]) -> TrustConfig {
    TrustConfig {
        trust_dns_name: "edge.cluster.test".into(),
        cluster_cidrs: cluster.iter().map(|s| s.to_string()).collect(),
        disable_default: true,
        ..TrustConfig::default()
    }
}

pub fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
        .collect()
}

/// Start an upstream that answers with the request headers as JSON.
pub async fn start_echo_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(|req: Request<Body>| async move { Json(header_map(req.headers())) });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

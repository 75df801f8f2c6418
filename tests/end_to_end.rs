//! Full proxy: listener → edge trust → upstream.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use edge_trust_proxy::config::ProxyConfig;
use edge_trust_proxy::lifecycle::Shutdown;
use edge_trust_proxy::trust::{EdgeTrust, SystemResolver};
use edge_trust_proxy::HttpServer;
use tokio::net::TcpListener;

mod common;

async fn start_proxy(trusted: &[&str], upstream: SocketAddr, shutdown: &Shutdown) -> SocketAddr {
    let mut config = ProxyConfig::default();
    config.upstream.address = upstream.to_string();
    config.trust = common::static_trust(trusted);

    let trust = EdgeTrust::new(&config.trust, &[], Arc::new(SystemResolver)).await.unwrap();
    let server = HttpServer::new(&config, Arc::new(trust)).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    addr
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn trusted_loopback_edge_is_honoured() {
    let upstream = common::start_echo_upstream().await;
    let shutdown = Shutdown::new();
    let proxy = start_proxy(&["127.0.0.0/8"], upstream, &shutdown).await;

    let res = client()
        .get(format!("http://{}/hello?x=1", proxy))
        .header("CF-Connecting-IP", "1.2.3.4")
        .header("CF-Visitor", r#"{"scheme":"https"}"#)
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    let headers: BTreeMap<String, String> = res.json().await.unwrap();
    assert_eq!(headers["x-is-trusted"], "yes");
    assert_eq!(headers["x-real-ip"], "1.2.3.4");
    assert_eq!(headers["x-forwarded-for"], "1.2.3.4");
    assert_eq!(headers["x-forwarded-proto"], "https");

    shutdown.trigger();
}

#[tokio::test]
async fn untrusted_loopback_is_rewritten() {
    let upstream = common::start_echo_upstream().await;
    let shutdown = Shutdown::new();
    let proxy = start_proxy(&["10.0.0.0/8"], upstream, &shutdown).await;

    let res = client()
        .get(format!("http://{}/", proxy))
        .header("CF-Connecting-IP", "1.2.3.4")
        .header("X-Forwarded-For", "1.2.3.4")
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    let headers: BTreeMap<String, String> = res.json().await.unwrap();
    assert_eq!(headers["x-is-trusted"], "no");
    assert_eq!(headers["x-real-ip"], "127.0.0.1");
    assert!(!headers.contains_key("cf-connecting-ip"));
    assert!(!headers.contains_key("x-forwarded-for"));

    shutdown.trigger();
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    // Bind then drop to get a port nobody listens on.
    let upstream = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let shutdown = Shutdown::new();
    let proxy = start_proxy(&["127.0.0.0/8"], upstream, &shutdown).await;

    let res = client().get(format!("http://{}/", proxy)).send().await.unwrap();
    assert_eq!(res.status(), 502);

    shutdown.trigger();
}

//! Edge trust middleware.
//! Rewrites client identity headers according to the peer's trust.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::trust::rewrite::{self, Verdict};
use crate::trust::EdgeTrust;

/// Peer address as text, set by an outer layer that knows better than the
/// socket (e.g. a PROXY protocol acceptor). Takes precedence over
/// `ConnectInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// The immediate peer of the request, or an empty string if unknown.
pub fn peer_address(req: &Request<Body>) -> String {
    if let Some(RemoteAddr(addr)) = req.extensions().get::<RemoteAddr>() {
        return addr.clone();
    }
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.to_string();
    }
    String::new()
}

pub async fn edge_trust_middleware(
    State(trust): State<Arc<EdgeTrust>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let peer = peer_address(&req);
    let edge_marker = rewrite::has_edge_marker(req.headers());
    let decision = trust.evaluate(&peer, edge_marker).await;

    match rewrite::apply(&decision, req.headers_mut(), trust.debug()) {
        Ok(verdict) => {
            if trust.debug() {
                tracing::info!(
                    instance = %trust.name(),
                    peer = ?decision.peer,
                    trusted = decision.is_trusted(),
                    edge = edge_marker,
                    verdict = ?verdict,
                    "Edge trust evaluated"
                );
            } else if verdict == Verdict::Degraded {
                tracing::debug!(instance = %trust.name(), peer = ?decision.peer, "Edge trust degraded");
            }
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(instance = %trust.name(), peer = %peer, error = %e, "Rejecting request");
            e.into_response()
        }
    }
}

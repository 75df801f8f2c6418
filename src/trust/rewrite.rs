//! Header rewrite policy.
//!
//! # Responsibilities
//! - Turn a `TrustDecision` into header mutations on one request
//! - Map the error outcomes onto rejections
//!
//! # Header Handling
//! ```text
//! always           X-Is-Trusted: no (reset before anything else)
//! Trusted          CF-Visitor ok      → X-Forwarded-Proto: <scheme>
//!                  CF-Visitor broken  → treated as Untrusted below
//!                  CF-Visitor empty or null → ignored
//!                  CF-Connecting-IP   → X-Is-Trusted: yes,
//!                                       X-Forwarded-For + X-Real-Ip: <value>
//! Untrusted        X-Real-Ip: <peer>; drop X-Forwarded-For, CF-Visitor,
//!                  CF-Connecting-IP
//! ```

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use crate::trust::engine::{TrustDecision, TrustOutcome};
use crate::trust::error::TrustError;

pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
pub const X_IS_TRUSTED: HeaderName = HeaderName::from_static("x-is-trusted");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const CF_CONNECTING_IP: HeaderName = HeaderName::from_static("cf-connecting-ip");
pub const CF_VISITOR: HeaderName = HeaderName::from_static("cf-visitor");

const YES: HeaderValue = HeaderValue::from_static("yes");
const NO: HeaderValue = HeaderValue::from_static("no");

/// Emit at `info` when the instance runs with `debug`, else at `debug`.
macro_rules! diag {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Body of the `CF-Visitor` header, e.g. `{"scheme":"https"}`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CfVisitor {
    #[serde(default)]
    pub scheme: String,
}

impl CfVisitor {
    /// Parse a header value. A JSON `null` carries no descriptor.
    pub fn parse(value: &HeaderValue) -> Result<Option<Self>, serde_json::Error> {
        serde_json::from_slice(value.as_bytes())
    }
}

/// How the request leaves the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Trusted peer with an edge-supplied client address.
    Verified,
    /// Trusted peer, no client address to adopt.
    TrustedPeer,
    /// Trusted peer whose descriptor failed to parse.
    Degraded,
    Untrusted,
}

/// Whether the request claims to come through the edge provider.
pub fn has_edge_marker(headers: &HeaderMap) -> bool {
    headers
        .get(&CF_CONNECTING_IP)
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

/// Apply the policy. `Err` means the request must not be forwarded.
pub fn apply(
    decision: &TrustDecision,
    headers: &mut HeaderMap,
    debug: bool,
) -> Result<Verdict, TrustError> {
    headers.insert(X_IS_TRUSTED, NO);

    let peer = match decision.outcome {
        TrustOutcome::Fatal => return Err(TrustError::MalformedPeerAddress(decision.raw.clone())),
        TrustOutcome::AddressError => return Err(TrustError::UnparseableAddress(decision.raw.clone())),
        TrustOutcome::Trusted | TrustOutcome::Untrusted => match decision.direct_ip() {
            Some(peer) => peer,
            None => return Err(TrustError::NoAddressResolved),
        },
    };

    if decision.outcome == TrustOutcome::Untrusted {
        strip_untrusted(headers, &peer);
        return Ok(Verdict::Untrusted);
    }

    if let Some(value) = headers.get(&CF_VISITOR).filter(|v| !v.is_empty()) {
        match CfVisitor::parse(value) {
            Ok(None) => {
                diag!(debug, peer = %peer, "CF-Visitor is null, no scheme");
            }
            Ok(Some(visitor)) => {
                diag!(debug, peer = %peer, scheme = %visitor.scheme, "CF-Visitor accepted");
                if let Ok(proto) = HeaderValue::from_str(&visitor.scheme) {
                    if !proto.is_empty() {
                        headers.insert(X_FORWARDED_PROTO, proto);
                    }
                }
            }
            Err(e) => {
                diag!(debug, peer = %peer, error = %e, "Malformed CF-Visitor header, downgrading trust");
                strip_untrusted(headers, &peer);
                return Ok(Verdict::Degraded);
            }
        }
    }

    let client = headers.get(&CF_CONNECTING_IP).filter(|v| !v.is_empty()).cloned();
    match client {
        Some(client) => {
            headers.insert(X_IS_TRUSTED, YES);
            headers.insert(X_FORWARDED_FOR, client.clone());
            headers.insert(X_REAL_IP, client);
            Ok(Verdict::Verified)
        }
        None => Ok(Verdict::TrustedPeer),
    }
}

/// Replace every client-supplied identity header with the observed peer.
fn strip_untrusted(headers: &mut HeaderMap, peer: &str) {
    headers.insert(X_IS_TRUSTED, NO);
    match HeaderValue::from_str(peer) {
        Ok(value) => {
            headers.insert(X_REAL_IP, value);
        }
        Err(_) => {
            headers.remove(&X_REAL_IP);
        }
    }
    headers.remove(&X_FORWARDED_FOR);
    headers.remove(&CF_VISITOR);
    headers.remove(&CF_CONNECTING_IP);
}

//! Edge trust reverse proxy.
//!
//! Decides whether a request's immediate peer is a trusted edge node and
//! rewrites `X-Real-Ip`, `X-Forwarded-For`, `X-Forwarded-Proto` and
//! `X-Is-Trusted` accordingly before forwarding.

// Core subsystems
pub mod config;
pub mod http;
pub mod trust;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use trust::{EdgeTrust, TrustDecision, TrustOutcome};

//! Request middleware.

pub mod edge_trust;

pub use edge_trust::{edge_trust_middleware, peer_address, RemoteAddr};

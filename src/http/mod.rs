//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → middleware/edge_trust.rs (trust decision, header rewrite)
//!     → forward.rs (send to upstream)
//!     → Send response to client
//! ```

pub mod forward;
pub mod middleware;
pub mod server;

pub use server::HttpServer;

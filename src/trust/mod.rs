//! Edge trust subsystem.
//!
//! # Data Flow
//! ```text
//! Request (peer "host:port", CF-* headers)
//!     → engine.rs (split, parse, look up in trusted set)
//!         ↳ cluster miss with edge marker → refresh.rs forced refresh
//!     → rewrite.rs (X-Is-Trusted, X-Real-Ip, X-Forwarded-*)
//!     → forward, or reject with 500 / 400 / 422
//!
//! Background (DNS source only):
//!     refresh.rs timer → resolver.rs lookup → networks.rs atomic swap
//! ```
//!
//! # Design Decisions
//! - Fail closed: a failed DNS lookup empties the trusted set
//! - The trusted set is an immutable snapshot swapped wholesale
//! - Client identity headers are never believed from an untrusted peer

pub mod defaults;
pub mod engine;
pub mod error;
pub mod networks;
pub mod refresh;
pub mod resolver;
pub mod rewrite;

pub use engine::{EdgeTrust, TrustDecision, TrustOutcome};
pub use error::TrustError;
pub use networks::{NetworkSet, TrustedNetworks};
pub use resolver::{DnsSource, HostResolver, SystemResolver};
pub use rewrite::Verdict;

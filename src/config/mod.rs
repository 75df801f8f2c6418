//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, CIDR syntax)
//!     → ProxyConfig (validated, immutable)
//!     → TrustConfig handed to EdgeTrust at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any invalid CIDR is fatal: the instance is never built from a bad config

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ListenerConfig, ObservabilityConfig, ProxyConfig, TimeoutConfig, TrustConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};

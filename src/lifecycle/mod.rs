//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → EdgeTrust (initial DNS resolve) → metrics → listener → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Stop refresher → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: trust first, listeners last (traffic only when ready)
//! - Fail fast: an invalid trust configuration aborts startup
//! - Each refresh scheduler owns its own `Shutdown`; process shutdown stops
//!   it through the owning instance

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError};

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build container → Resolve kernel → Start listener
//!
//! Signals (signals.rs):
//!     SIGINT → graceful shutdown of the HTTP host adapter
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then services, then listeners
//! - In-flight requests finish before the server exits

pub mod signals;
pub mod startup;

pub use startup::{bootstrap, start, Application, StartupError, StartupResult};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (filter + pretty or JSON output)
//!
//! The HTTP host adapter adds a per-request span via tower-http and
//! tags each request with an `x-request-id`.
//! ```

pub mod logging;

pub use logging::init_logging;

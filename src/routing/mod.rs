//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! ServerRequest (method, request target)
//!     → kernel.rs (entry point, resolved from the container)
//!     → router.rs (scan routes in registration order)
//!     → route.rs (compiled template match, positional captures)
//!     → handler.rs (function or controller action)
//!     → Response (passed through, or wrapped: JSON for API routes, text otherwise)
//! ```
//!
//! # Design Decisions
//! - Templates compiled when the route is built, immutable afterwards
//! - First match wins, ordered by registration; web routes precede API routes
//! - Unmatched requests get a 404 `{"error":"Not Found"}` response

pub mod error;
pub mod handler;
pub mod kernel;
pub mod route;
pub mod router;

pub use error::{RoutingError, RoutingResult};
pub use handler::{Controller, Handler, HandlerResult, Outcome};
pub use kernel::{Kernel, ROUTER};
pub use route::Route;
pub use router::Router;

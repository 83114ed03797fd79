//! HTTP host adapter.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware, fallback handler)
//!     → request.rs (request ID, parts → Environment)
//!     → Application (ServerRequest → kernel → Response), on a blocking task
//!     → response.rs (status, headers, rendered body, x-request-id)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, REQUEST_ID_ATTRIBUTE, X_REQUEST_ID};
pub use server::HttpServer;

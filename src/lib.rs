//! Trellis: a minimal web-request processing core.
//!
//! Immutable HTTP message values, a registration-order path-template router and a
//! cycle-safe autowiring container, plus an axum host adapter to serve them.

pub mod app;
pub mod config;
pub mod container;
pub mod http;
pub mod lifecycle;
pub mod message;
pub mod observability;
pub mod routing;

pub use config::schema::AppConfig;
pub use container::Container;
pub use http::HttpServer;
pub use lifecycle::{bootstrap, start, Application};
pub use routing::{Kernel, Route, Router};

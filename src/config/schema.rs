//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the application.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::message::factory::DEFAULT_BODY_MODE;
use crate::message::response::RENDER_CHUNK_SIZE;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP host adapter settings.
    pub server: ServerConfig,

    /// Route table settings.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Body stream settings.
    pub streams: StreamConfig,
}

/// HTTP host adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Scheme used when building request URIs ("http" or "https").
    pub public_scheme: String,

    /// Total time allowed per request.
    pub request_timeout_secs: u64,

    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            public_scheme: "http".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Route table configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Prefix for the built-in web and API routes, e.g. "/cts-trellis".
    /// Empty mounts them at the root.
    pub base_path: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// Body stream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Open mode for in-memory bodies; must allow both reading and writing.
    pub body_mode: String,

    /// Chunk size used when rendering response bodies.
    pub render_chunk_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            body_mode: DEFAULT_BODY_MODE.to_string(),
            render_chunk_size: RENDER_CHUNK_SIZE,
        }
    }
}

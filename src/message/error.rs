//! Message-layer error definitions.

use thiserror::Error;

/// Errors raised by the HTTP message value types.
///
/// Every variant carries an intended HTTP status, see [`MessageError::status_code`].
#[derive(Debug, Error)]
pub enum MessageError {
    /// Invalid header name/value, protocol version or body.
    #[error("The HTTP message could not be processed. {0}")]
    Message(String),

    /// Invalid request target or other request-level input.
    #[error("The HTTP request could not be processed. {0}")]
    Request(String),

    /// Method outside the supported set.
    #[error("Invalid HTTP method: {0}")]
    Method(String),

    /// Invalid status code or response construction failure.
    #[error("The HTTP response could not be processed. {0}")]
    Response(String),

    /// Request body declared as JSON failed to decode.
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Capability violation on a stream.
    #[error("The HTTP stream could not be accessed. {0}")]
    Stream(String),

    /// Underlying stream resource failed.
    #[error("The HTTP stream operation failed: {0}")]
    StreamIo(#[source] std::io::Error),

    /// Invalid scheme, host, port, path, query or fragment.
    #[error("The specified URI could not be loaded. {0}")]
    Uri(String),

    /// Upload in an error state, or invalid move target.
    #[error("The uploaded file could not be processed. {0}")]
    Upload(String),

    /// Upload relocation failed at the filesystem level.
    #[error("The uploaded file could not be moved: {0}")]
    UploadIo(#[source] std::io::Error),
}

impl MessageError {
    /// HTTP status the boundary should answer with when this error goes uncaught.
    pub fn status_code(&self) -> u16 {
        match self {
            MessageError::Method(_) | MessageError::InvalidJson(_) => 400,
            _ => 500,
        }
    }
}

/// Result type for message-layer operations.
pub type MessageResult<T> = Result<T, MessageError>;

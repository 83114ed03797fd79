//! Routing error definitions.

use thiserror::Error;

use crate::message::MessageError;

/// Errors raised while building routes or running handlers.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The path template could not be compiled into a matcher.
    #[error("Invalid route template '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// A handler or response conversion failed in the message layer.
    #[error(transparent)]
    Message(#[from] MessageError),
}

impl RoutingError {
    /// HTTP status the host should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            RoutingError::Template { .. } => 500,
            RoutingError::Message(err) => err.status_code(),
        }
    }
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

//! Container error definitions.

use thiserror::Error;

/// Errors raised while registering or resolving services.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The identifier already has a binding.
    #[error("Service '{0}' is already registered")]
    AlreadyRegistered(String),

    /// No concrete was given and the identifier names no instantiable type.
    #[error("Service '{0}' could not be found")]
    NotFound(String),

    /// An interface was bound to something that does not implement it.
    #[error("Invalid implementation '{concrete}' for interface '{interface}'")]
    InvalidImplementation { interface: String, concrete: String },

    /// Lookup of an unknown identifier.
    #[error("Service '{0}' could not be resolved")]
    Unresolved(String),

    /// A primitive or untyped constructor parameter without a default.
    #[error("Cannot resolve non-class parameter '{parameter}' of '{type_id}'")]
    UnresolvableParameter { type_id: String, parameter: String },

    /// A type was requested while its own construction was in progress.
    #[error("Circular dependency detected for '{0}'")]
    CircularDependency(String),

    /// The type's constructor itself failed.
    #[error("Error resolving '{type_id}': {message}")]
    Construction { type_id: String, message: String },

    /// A resolved service or argument is not of the requested Rust type.
    #[error("Service '{id}' is not a {expected}")]
    TypeMismatch { id: String, expected: &'static str },
}

impl ContainerError {
    pub fn construction(type_id: &str, err: impl std::fmt::Display) -> Self {
        ContainerError::Construction {
            type_id: type_id.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

//! Dependency injection subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Injectable types → descriptor.rs (TypeRegistry)
//!     → container.rs register(id, concrete)
//!
//! Lookup:
//!     get(id)
//!     → singleton cache hit? return it
//!     → factory / bound type / the id itself
//!     → autowire constructor parameters recursively
//!     → cache and return
//! ```
//!
//! # Design Decisions
//! - Types describe their constructor parameters explicitly; nothing is inferred
//! - Every resolved service is a process-wide singleton
//! - An in-progress set detects cycles; it is cleared on every exit path

#[allow(clippy::module_inception)]
pub mod container;
pub mod descriptor;
pub mod error;

pub use container::{Concrete, Container, Factory};
pub use descriptor::{Arguments, Injectable, Parameter, Service, TypeDescriptor, TypeRegistry};
pub use error::{ContainerError, ContainerResult};

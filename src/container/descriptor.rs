//! Runtime type descriptors used for autowiring.
//!
//! A descriptor lists a type's constructor parameters in declaration order and the
//! capabilities (interfaces) it satisfies, plus a constructor taking the resolved
//! arguments. The container reads descriptors instead of inspecting types.

use std::any::{type_name, Any};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::container::error::{ContainerError, ContainerResult};

/// A resolved service instance.
pub type Service = Arc<dyn Any + Send + Sync>;

type Constructor = Arc<dyn Fn(&Arguments) -> ContainerResult<Service> + Send + Sync>;

/// One constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Class-typed; resolved recursively through the container.
    Service {
        name: &'static str,
        type_id: &'static str,
    },
    /// Primitive or untyped; only resolvable through its default.
    Value {
        name: &'static str,
        default: Option<Value>,
    },
}

impl Parameter {
    pub fn service(name: &'static str, type_id: &'static str) -> Self {
        Parameter::Service { name, type_id }
    }

    pub fn value(name: &'static str, default: impl Into<Value>) -> Self {
        Parameter::Value {
            name,
            default: Some(default.into()),
        }
    }

    pub fn required_value(name: &'static str) -> Self {
        Parameter::Value {
            name,
            default: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Service { name, .. } | Parameter::Value { name, .. } => name,
        }
    }
}

/// A resolved constructor argument.
#[derive(Clone)]
pub enum Argument {
    Service(Service),
    Value(Value),
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Service(_) => f.write_str("Service(..)"),
            Argument::Value(v) => write!(f, "Value({v})"),
        }
    }
}

/// Arguments handed to a constructor, in parameter order.
#[derive(Debug, Default)]
pub struct Arguments {
    items: Vec<(&'static str, Argument)>,
}

impl Arguments {
    pub(crate) fn push(&mut self, name: &'static str, argument: Argument) {
        self.items.push((name, argument));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn get(&self, name: &str) -> Option<&Argument> {
        self.items.iter().find(|(n, _)| *n == name).map(|(_, a)| a)
    }

    /// Service argument `name`, downcast to `T`.
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        match self.get(name) {
            Some(Argument::Service(service)) => {
                service
                    .clone()
                    .downcast::<T>()
                    .map_err(|_| ContainerError::TypeMismatch {
                        id: name.to_string(),
                        expected: type_name::<T>(),
                    })
            }
            _ => Err(ContainerError::TypeMismatch {
                id: name.to_string(),
                expected: type_name::<T>(),
            }),
        }
    }

    /// Primitive argument `name`.
    pub fn value(&self, name: &str) -> ContainerResult<&Value> {
        match self.get(name) {
            Some(Argument::Value(value)) => Ok(value),
            _ => Err(ContainerError::TypeMismatch {
                id: name.to_string(),
                expected: "value",
            }),
        }
    }
}

/// A type the container can build on its own.
pub trait Injectable: Any + Send + Sync + Sized {
    /// Identifier the type is known by inside the container.
    const TYPE_ID: &'static str;

    /// Constructor parameters in declaration order.
    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    /// Capability identifiers this type satisfies.
    fn capabilities() -> &'static [&'static str] {
        &[]
    }

    fn construct(args: &Arguments) -> ContainerResult<Self>;
}

/// Everything the container needs to know to build one type.
#[derive(Clone)]
pub struct TypeDescriptor {
    type_id: &'static str,
    parameters: Vec<Parameter>,
    capabilities: Vec<&'static str>,
    constructor: Constructor,
}

impl TypeDescriptor {
    pub fn new<F>(type_id: &'static str, parameters: Vec<Parameter>, constructor: F) -> Self
    where
        F: Fn(&Arguments) -> ContainerResult<Service> + Send + Sync + 'static,
    {
        Self {
            type_id,
            parameters,
            capabilities: Vec::new(),
            constructor: Arc::new(constructor),
        }
    }

    pub fn of<T: Injectable>() -> Self {
        let mut descriptor = Self::new(T::TYPE_ID, T::parameters(), |args| {
            T::construct(args).map(|value| Arc::new(value) as Service)
        });
        descriptor.capabilities = T::capabilities().to_vec();
        descriptor
    }

    pub fn implements(mut self, capability: &'static str) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Replace the default of primitive parameter `name`; other parameters are untouched.
    pub fn with_default(mut self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        for parameter in &mut self.parameters {
            if let Parameter::Value { name: n, default } = parameter {
                if *n == name {
                    *default = Some(value.clone());
                }
            }
        }
        self
    }

    pub fn type_id(&self) -> &'static str {
        self.type_id
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn satisfies(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| *c == capability)
    }

    pub(crate) fn construct(&self, args: &Arguments) -> ContainerResult<Service> {
        (self.constructor)(args)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_id", &self.type_id)
            .field("parameters", &self.parameters)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Known concrete types and abstract capabilities.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<&'static str, TypeDescriptor>,
    capabilities: HashSet<&'static str>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Injectable>(&mut self) -> &mut Self {
        self.define(TypeDescriptor::of::<T>())
    }

    pub fn define(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types.insert(descriptor.type_id, descriptor);
        self
    }

    /// Declare an abstract capability; it can be bound but never built directly.
    pub fn declare_capability(&mut self, capability: &'static str) -> &mut Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn descriptor(&self, type_id: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_id)
    }

    pub fn is_instantiable(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn is_capability(&self, id: &str) -> bool {
        self.capabilities.contains(id)
    }
}

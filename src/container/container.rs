//! Service container with constructor autowiring.

use std::any::{type_name, Any};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::container::descriptor::{Argument, Arguments, Parameter, Service, TypeRegistry};
use crate::container::error::{ContainerError, ContainerResult};

/// Builds a service, with access to the container for its own dependencies.
pub type Factory = Arc<dyn Fn(&mut Container) -> ContainerResult<Service> + Send + Sync>;

/// What an identifier is bound to.
#[derive(Clone)]
pub enum Concrete {
    /// A type known to the registry, built by autowiring.
    Type(String),
    /// An explicit factory.
    Factory(Factory),
}

impl Concrete {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&mut Container) -> ContainerResult<Service> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(factory))
    }

    fn describe(&self) -> String {
        match self {
            Concrete::Type(type_id) => type_id.clone(),
            Concrete::Factory(_) => "<factory>".to_string(),
        }
    }
}

impl From<&str> for Concrete {
    fn from(type_id: &str) -> Self {
        Concrete::Type(type_id.to_string())
    }
}

/// Service container.
///
/// Resolution needs `&mut self`: the singleton cache and the in-progress set are
/// instance state, so sharing a container across threads requires wrapping it in a lock.
pub struct Container {
    registry: TypeRegistry,
    services: HashMap<String, Concrete>,
    singletons: HashMap<String, Service>,
    resolving: HashSet<String>,
}

impl Container {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            services: HashMap::new(),
            singletons: HashMap::new(),
            resolving: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Bind `id` to `concrete`, or to itself when `concrete` is `None`.
    ///
    /// Fails when `id` already has a binding, when `id` cannot stand for itself, or when
    /// `id` is a capability and `concrete` is not a type satisfying it.
    pub fn register(&mut self, id: &str, concrete: Option<Concrete>) -> ContainerResult<()> {
        if self.services.contains_key(id) {
            return Err(ContainerError::AlreadyRegistered(id.to_string()));
        }

        let concrete = match concrete {
            Some(concrete) => concrete,
            None if self.registry.is_instantiable(id) => Concrete::Type(id.to_string()),
            None => return Err(ContainerError::NotFound(id.to_string())),
        };

        if self.registry.is_capability(id) {
            let satisfied = match &concrete {
                Concrete::Type(type_id) => self
                    .registry
                    .descriptor(type_id)
                    .is_some_and(|d| d.satisfies(id)),
                Concrete::Factory(_) => false,
            };
            if !satisfied {
                return Err(ContainerError::InvalidImplementation {
                    interface: id.to_string(),
                    concrete: concrete.describe(),
                });
            }
        }

        tracing::debug!(service = %id, concrete = %concrete.describe(), "Service registered");
        self.services.insert(id.to_string(), concrete);
        Ok(())
    }

    /// Explicitly registered, or an instantiable type usable as its own binding.
    pub fn has(&self, id: &str) -> bool {
        self.services.contains_key(id) || self.registry.is_instantiable(id)
    }

    /// Whether `id` has been built and cached.
    pub fn is_resolved(&self, id: &str) -> bool {
        self.singletons.contains_key(id)
    }

    /// Cached instance for `id`, building and caching it on first use.
    pub fn get(&mut self, id: &str) -> ContainerResult<Service> {
        if let Some(instance) = self.singletons.get(id) {
            return Ok(instance.clone());
        }

        let instance = match self.services.get(id).cloned() {
            Some(Concrete::Factory(factory)) => self.guarded(id, |c| factory(c))?,
            // An alias shares the concrete type's singleton.
            Some(Concrete::Type(type_id)) if type_id != id => {
                self.guarded(id, |c| c.get(&type_id))?
            }
            Some(Concrete::Type(type_id)) => self.resolve(&type_id)?,
            None if self.registry.is_instantiable(id) => self.resolve(id)?,
            None => return Err(ContainerError::Unresolved(id.to_string())),
        };

        self.singletons.insert(id.to_string(), instance.clone());
        Ok(instance)
    }

    /// [`Container::get`] followed by a downcast to `T`.
    pub fn get_as<T: Any + Send + Sync>(&mut self, id: &str) -> ContainerResult<Arc<T>> {
        self.get(id)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                id: id.to_string(),
                expected: type_name::<T>(),
            })
    }

    fn resolve(&mut self, type_id: &str) -> ContainerResult<Service> {
        self.guarded(type_id, |c| c.create_instance(type_id))
    }

    /// Run `build` with `key` marked in progress; the mark is cleared on every outcome.
    fn guarded<F>(&mut self, key: &str, build: F) -> ContainerResult<Service>
    where
        F: FnOnce(&mut Self) -> ContainerResult<Service>,
    {
        if !self.resolving.insert(key.to_string()) {
            tracing::warn!(service = %key, "Circular dependency detected");
            return Err(ContainerError::CircularDependency(key.to_string()));
        }

        let result = build(self);
        self.resolving.remove(key);

        result
    }

    fn create_instance(&mut self, type_id: &str) -> ContainerResult<Service> {
        let descriptor = self
            .registry
            .descriptor(type_id)
            .cloned()
            .ok_or_else(|| ContainerError::Unresolved(type_id.to_string()))?;

        let mut args = Arguments::default();
        for parameter in descriptor.parameters() {
            let argument = self.resolve_parameter(type_id, parameter)?;
            args.push(parameter.name(), argument);
        }

        tracing::debug!(type_id = %type_id, arguments = args.len(), "Autowiring service");
        descriptor.construct(&args)
    }

    fn resolve_parameter(&mut self, type_id: &str, parameter: &Parameter) -> ContainerResult<Argument> {
        match parameter {
            Parameter::Service { type_id: dependency, .. } => {
                self.get(dependency).map(Argument::Service)
            }
            Parameter::Value { default: Some(default), .. } => Ok(Argument::Value(default.clone())),
            Parameter::Value { name, default: None } => Err(ContainerError::UnresolvableParameter {
                type_id: type_id.to_string(),
                parameter: name.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .field("singletons", &self.singletons.keys().collect::<Vec<_>>())
            .finish()
    }
}

//! Container behaviour through the public API.

use std::sync::Arc;

use trellis::container::{
    Arguments, Concrete, Container, ContainerError, ContainerResult, Injectable, Parameter,
    TypeRegistry,
};

struct Config {
    dsn: String,
}

impl Injectable for Config {
    const TYPE_ID: &'static str = "Config";

    fn parameters() -> Vec<Parameter> {
        vec![Parameter::value("dsn", "sqlite::memory:")]
    }

    fn construct(args: &Arguments) -> ContainerResult<Self> {
        Ok(Self {
            dsn: args.value("dsn")?.as_str().unwrap_or_default().to_string(),
        })
    }
}

struct Database {
    config: Arc<Config>,
}

impl Injectable for Database {
    const TYPE_ID: &'static str = "Database";

    fn parameters() -> Vec<Parameter> {
        vec![Parameter::service("config", "Config")]
    }

    fn capabilities() -> &'static [&'static str] {
        &["DatabaseInterface"]
    }

    fn construct(args: &Arguments) -> ContainerResult<Self> {
        Ok(Self {
            config: args.service("config")?,
        })
    }
}

struct Chicken;

impl Injectable for Chicken {
    const TYPE_ID: &'static str = "Chicken";

    fn parameters() -> Vec<Parameter> {
        vec![Parameter::service("egg", "Egg")]
    }

    fn construct(_args: &Arguments) -> ContainerResult<Self> {
        Ok(Chicken)
    }
}

struct Egg;

impl Injectable for Egg {
    const TYPE_ID: &'static str = "Egg";

    fn parameters() -> Vec<Parameter> {
        vec![Parameter::service("chicken", "Chicken")]
    }

    fn construct(_args: &Arguments) -> ContainerResult<Self> {
        Ok(Egg)
    }
}

fn container() -> Container {
    let mut registry = TypeRegistry::new();
    registry
        .register::<Config>()
        .register::<Database>()
        .register::<Chicken>()
        .register::<Egg>()
        .declare_capability("DatabaseInterface");
    Container::new(registry)
}

#[test]
fn test_duplicate_registration_keeps_first_binding() {
    let mut container = container();
    container
        .register("DatabaseInterface", Some("Database".into()))
        .unwrap();

    let err = container
        .register("DatabaseInterface", Some("Database".into()))
        .unwrap_err();
    assert!(matches!(err, ContainerError::AlreadyRegistered(ref id) if id == "DatabaseInterface"));

    let db = container.get_as::<Database>("DatabaseInterface").unwrap();
    assert_eq!(db.config.dsn, "sqlite::memory:");
}

#[test]
fn test_circular_dependency_is_reported_and_nothing_cached() {
    let mut container = container();

    let err = container.get("Chicken").unwrap_err();
    assert!(matches!(err, ContainerError::CircularDependency(_)));
    assert!(err.to_string().contains("Circular dependency"));
    assert!(!container.is_resolved("Chicken"));
    assert!(!container.is_resolved("Egg"));

    // Unrelated services still resolve afterwards.
    assert!(container.get_as::<Database>("Database").is_ok());
}

#[test]
fn test_factory_overrides_autowiring() {
    let mut container = container();
    container
        .register(
            "Config",
            Some(Concrete::factory(|_| {
                Ok(Arc::new(Config {
                    dsn: "postgres://localhost/app".into(),
                }) as trellis::container::Service)
            })),
        )
        .unwrap();

    let db = container.get_as::<Database>("Database").unwrap();
    assert_eq!(db.config.dsn, "postgres://localhost/app");
}

#[test]
fn test_unknown_and_abstract_ids() {
    let mut container = container();
    assert!(!container.has("Cache"));
    assert!(matches!(container.get("Cache"), Err(ContainerError::Unresolved(_))));

    // Declared but unbound capabilities are not instantiable.
    assert!(!container.has("DatabaseInterface"));
    assert!(matches!(
        container.register("DatabaseInterface", None),
        Err(ContainerError::NotFound(_))
    ));
    assert!(matches!(
        container.register("DatabaseInterface", Some("Config".into())),
        Err(ContainerError::InvalidImplementation { .. })
    ));
}

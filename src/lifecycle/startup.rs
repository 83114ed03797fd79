//! Startup orchestration.
//!
//! # Responsibilities
//! - Describe the framework services to the container
//! - Bind message factories behind their interfaces, the router by factory
//! - Resolve the kernel and request factory once, before any traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The container is consulted only here; request handling uses the resolved services

use std::sync::Arc;

use thiserror::Error;

use crate::app;
use crate::config::{validate_config, AppConfig, ConfigError};
use crate::container::{
    Concrete, Container, ContainerError, Injectable, Service, TypeDescriptor, TypeRegistry,
};
use crate::message::factory::{
    RESPONSE_FACTORY, SERVER_REQUEST_FACTORY, STREAM_FACTORY, UPLOADED_FILE_FACTORY, URI_FACTORY,
};
use crate::message::{
    Environment, ResponseFactory, Response, ServerRequest, ServerRequestFactory, StreamFactory,
    UploadedFileFactory, UriFactory,
};
use crate::routing::{Kernel, Route, Router, RoutingError, RoutingResult, ROUTER};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Routing(#[from] RoutingError),
}

pub type StartupResult<T> = Result<T, StartupError>;

/// Resolved services for handling requests.
#[derive(Debug)]
pub struct Application {
    config: AppConfig,
    container: Container,
    kernel: Arc<Kernel>,
    requests: Arc<ServerRequestFactory>,
    streams: Arc<StreamFactory>,
}

impl Application {
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn requests(&self) -> &ServerRequestFactory {
        &self.requests
    }

    /// Chunk size for rendering response bodies.
    pub fn chunk_size(&self) -> usize {
        self.streams.chunk_size()
    }

    pub fn handle(&self, request: &ServerRequest) -> RoutingResult<Response> {
        self.kernel.dispatch(request)
    }

    /// Build a request from `env` and dispatch it.
    pub fn handle_environment(&self, env: Environment) -> RoutingResult<Response> {
        let request = self.requests.from_environment(env)?;
        self.handle(&request)
    }
}

fn registry(config: &AppConfig) -> TypeRegistry {
    let streams = TypeDescriptor::of::<StreamFactory>()
        .with_default("mode", config.streams.body_mode.clone())
        .with_default("chunk_size", config.streams.render_chunk_size);

    let mut registry = TypeRegistry::new();
    registry
        .define(streams)
        .register::<UriFactory>()
        .register::<ResponseFactory>()
        .register::<UploadedFileFactory>()
        .register::<ServerRequestFactory>()
        .register::<Kernel>()
        .declare_capability(STREAM_FACTORY)
        .declare_capability(URI_FACTORY)
        .declare_capability(RESPONSE_FACTORY)
        .declare_capability(UPLOADED_FILE_FACTORY)
        .declare_capability(SERVER_REQUEST_FACTORY);
    registry
}

/// Wire the container and resolve the application services for `routes`.
///
/// `config` is validated first, so configs built in code get the same checks as loaded ones.
pub fn bootstrap(config: &AppConfig, routes: Vec<Route>) -> StartupResult<Application> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let mut container = Container::new(registry(config));

    container.register(STREAM_FACTORY, Some(StreamFactory::TYPE_ID.into()))?;
    container.register(URI_FACTORY, Some(UriFactory::TYPE_ID.into()))?;
    container.register(RESPONSE_FACTORY, Some(ResponseFactory::TYPE_ID.into()))?;
    container.register(UPLOADED_FILE_FACTORY, Some(UploadedFileFactory::TYPE_ID.into()))?;
    container.register(SERVER_REQUEST_FACTORY, Some(ServerRequestFactory::TYPE_ID.into()))?;

    let router = Arc::new(Router::from_routes(routes));
    container.register(
        ROUTER,
        Some(Concrete::factory(move |_| Ok(router.clone() as Service))),
    )?;
    container.register(Kernel::TYPE_ID, None)?;

    let kernel = container.get_as::<Kernel>(Kernel::TYPE_ID)?;
    let requests = container.get_as::<ServerRequestFactory>(SERVER_REQUEST_FACTORY)?;
    let streams = container.get_as::<StreamFactory>(STREAM_FACTORY)?;

    tracing::info!(
        routes = kernel.router().len(),
        body_mode = %streams.mode(),
        chunk_size = streams.chunk_size(),
        "Application bootstrapped"
    );

    Ok(Application {
        config: config.clone(),
        container,
        kernel,
        requests,
        streams,
    })
}

/// Bootstrap with the built-in route tables mounted under the configured base path.
pub fn start(config: &AppConfig) -> StartupResult<Application> {
    let routes = app::routes::all(&config.routing.base_path)?;
    bootstrap(config, routes)
}

//! Request-handling entry point.

use std::sync::Arc;

use crate::container::{Arguments, ContainerResult, Injectable, Parameter};
use crate::message::{HttpRequest, Response};
use crate::routing::error::RoutingResult;
use crate::routing::router::Router;

/// Container id the router is bound under.
pub const ROUTER: &str = "Router";

/// Hands each request to the router.
#[derive(Debug, Clone)]
pub struct Kernel {
    router: Arc<Router>,
}

impl Kernel {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn dispatch<R: HttpRequest>(&self, request: &R) -> RoutingResult<Response> {
        self.router.route(request)
    }
}

impl Injectable for Kernel {
    const TYPE_ID: &'static str = "Kernel";

    fn parameters() -> Vec<Parameter> {
        vec![Parameter::service("router", ROUTER)]
    }

    fn construct(args: &Arguments) -> ContainerResult<Self> {
        Ok(Self::new(args.service("router")?))
    }
}

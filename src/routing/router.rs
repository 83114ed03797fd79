//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Select the first route whose template matches the request target and whose method
//!   equals the request method
//! - Run the handler and normalize its result into a [`Response`]
//!
//! # Design Decisions
//! - Registration order is priority: an earlier general template shadows a later,
//!   more specific one. Register specific routes first.
//! - Routes are immutable once registered; the router is shared via `Arc`
//! - No match is answered with a 404 response, never an error

use serde_json::json;

use crate::message::{HttpRequest, Response};
use crate::routing::error::RoutingResult;
use crate::routing::handler::Outcome;
use crate::routing::route::Route;

/// Ordered route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_routes(routes: impl IntoIterator<Item = Route>) -> Self {
        let mut router = Self::new();
        for route in routes {
            router.register(route);
        }
        router
    }

    /// Append `route`; duplicates are kept.
    pub fn register(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatch `request` to the first matching route.
    pub fn route<R: HttpRequest>(&self, request: &R) -> RoutingResult<Response> {
        let target = request.request_target();
        let method = request.method();

        for route in &self.routes {
            let Some(params) = route.captures(&target) else {
                continue;
            };
            if route.method() != method {
                continue;
            }

            tracing::debug!(
                method = %method,
                target = %target,
                route = %route.path(),
                params = ?params,
                "Route matched"
            );
            return execute(route, &params);
        }

        tracing::debug!(method = %method, target = %target, "No route matched");
        Ok(Response::json(&json!({ "error": "Not Found" }), 404)?)
    }
}

fn execute(route: &Route, params: &[String]) -> RoutingResult<Response> {
    let Some(result) = route.handler().invoke(params) else {
        tracing::warn!(route = %route.path(), handler = ?route.handler(), "Handler is not callable");
        return Ok(Response::html("Internal Server Error", 500)?);
    };

    let response = match result? {
        Outcome::Response(response) => response,
        Outcome::Value(value) if route.is_api() => Response::json(&value, 200)?,
        Outcome::Text(text) if route.is_api() => Response::json(&text, 200)?,
        Outcome::Value(serde_json::Value::String(text)) | Outcome::Text(text) => {
            Response::html(text, 200)?
        }
        Outcome::Value(value) => Response::html(value.to_string(), 200)?,
    };
    Ok(response)
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum router with a single fallback handler
//! - Wire up middleware (tracing, timeout)
//! - Convert each request into a ServerRequest and dispatch it off the async runtime
//! - Bind server to listener and shut down gracefully

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response as AxumResponse,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::request::{environment, RequestId, REQUEST_ID_ATTRIBUTE};
use crate::http::response::{error_response, into_axum};
use crate::lifecycle::signals::shutdown_signal;
use crate::lifecycle::Application;
use crate::routing::RoutingResult;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
    pub scheme: Arc<str>,
    pub max_body_bytes: usize,
}

/// HTTP host adapter for an [`Application`].
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    pub fn new(app: Application) -> Self {
        let config = app.config().clone();
        let state = AppState {
            app: Arc::new(app),
            scheme: Arc::from(config.server.public_scheme.as_str()),
            max_body_bytes: config.server.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, e.g. for driving it without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Serves every path: environment → ServerRequest → kernel → rendered response.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> AxumResponse {
    let start_time = Instant::now();
    let request_id = RequestId::from_headers(request.headers());
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body rejected");
            return error_response(413, "Request body too large", &request_id);
        }
    };

    let method = parts.method.clone();
    let target = parts.uri.to_string();
    let env = environment(&parts, body, remote, &state.scheme);

    let app = state.app.clone();
    let id = request_id.clone();
    let outcome = tokio::task::spawn_blocking(move || -> RoutingResult<_> {
        let request = app
            .requests()
            .from_environment(env)?
            .with_attribute(REQUEST_ID_ATTRIBUTE, id.to_string());
        let response = app.handle(&request)?;

        let mut body = Vec::new();
        response.render_with_chunk_size(&mut body, app.chunk_size())?;
        Ok((response, body))
    })
    .await;

    let out = match outcome {
        Ok(Ok((response, body))) => into_axum(&response, body, &request_id),
        Ok(Err(e)) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request failed");
            error_response(e.status_code(), &e.to_string(), &request_id)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task failed");
            error_response(500, "Internal Server Error", &request_id)
        }
    };

    tracing::info!(
        request_id = %request_id,
        method = %method,
        target = %target,
        status = out.status().as_u16(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request completed"
    );
    out
}

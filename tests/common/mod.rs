//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::body::Body;
use axum::response::Response as AxumResponse;

use trellis::config::AppConfig;
use trellis::lifecycle::{start, Application};
use trellis::message::{Environment, HttpMessage, Response};

pub const BASE_PATH: &str = "/cts-trellis";

/// Config with the demo routes mounted under [`BASE_PATH`].
pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.routing.base_path = BASE_PATH.to_string();
    config
}

pub fn app() -> Application {
    start(&config()).expect("application should bootstrap")
}

/// Dispatch `method target` with an optional body and content type.
pub fn send(app: &Application, method: &str, target: &str, body: Option<(&str, &str)>) -> Response {
    let mut env = Environment::new(method, target);
    if let Some((content_type, body)) = body {
        env.headers.push(("Content-Type".into(), content_type.into()));
        env.body = body.as_bytes().to_vec();
    }
    app.handle_environment(env).expect("dispatch should succeed")
}

pub fn get(app: &Application, target: &str) -> Response {
    send(app, "GET", target, None)
}

/// Rendered body of `response` as UTF-8.
pub fn body(response: &Response) -> String {
    let mut out = Vec::new();
    response.render(&mut out).expect("render should succeed");
    String::from_utf8(out).expect("body should be UTF-8")
}

pub fn header(response: &Response, name: &str) -> String {
    response.header_line(name)
}

/// Collect an axum response body as UTF-8.
pub async fn read_body(response: AxumResponse) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

pub fn empty() -> Body {
    Body::empty()
}

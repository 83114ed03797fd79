//! Inbound request conversion.
//!
//! # Responsibilities
//! - Assign a request ID (reuse a sane inbound `x-request-id`, else UUID v4)
//! - Translate axum request parts into an [`Environment`]
//! - Snapshot query, cookie and url-encoded form parameters
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Header values that are not valid UTF-8 are decoded lossily rather than dropped

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::header::{CONTENT_TYPE, COOKIE, HOST};
use axum::http::request::Parts;
use axum::http::uri::Authority;
use axum::http::{HeaderMap, Version};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::message::{Environment, Params};

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// ServerRequest attribute holding the request ID.
pub const REQUEST_ID_ATTRIBUTE: &str = "request_id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation ID for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The inbound `x-request-id` if it is short printable ASCII, else a fresh one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|id| {
                !id.is_empty()
                    && id.len() <= MAX_REQUEST_ID_LEN
                    && id.bytes().all(|b| b.is_ascii_graphic())
            })
            .map(|id| Self(id.to_string()))
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the environment for one request.
pub fn environment(
    parts: &Parts,
    body: Vec<u8>,
    remote: Option<SocketAddr>,
    scheme: &str,
) -> Environment {
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let mut env = Environment::new(parts.method.as_str(), target);
    env.scheme = scheme.to_string();
    env.protocol = protocol(parts.version).to_string();

    let authority = parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|host| Authority::from_str(host).ok())
        .or_else(|| parts.uri.authority().cloned());
    if let Some(authority) = &authority {
        env.host = authority.host().to_string();
        env.port = authority.port_u16();
    }

    env.headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    env.query_params = parts
        .uri
        .query()
        .map(|q| parse_form(q.as_bytes()))
        .unwrap_or_default();
    env.cookie_params = cookies(&parts.headers);
    env.server_params = server_params(parts, target, remote);

    let is_form = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if is_form && parts.method == axum::http::Method::POST {
        let form: Map<String, Value> = parse_form(&body)
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        env.parsed_body = Some(Value::Object(form));
    }

    env.body = body;
    env
}

fn protocol(version: Version) -> &'static str {
    if version == Version::HTTP_09 {
        "0.9"
    } else if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2.0"
    } else if version == Version::HTTP_3 {
        "3.0"
    } else {
        "1.1"
    }
}

fn parse_form(input: &[u8]) -> Params {
    url::form_urlencoded::parse(input).into_owned().collect()
}

/// `name=value` pairs from every `Cookie` header; the first occurrence of a name wins.
fn cookies(headers: &HeaderMap) -> Params {
    let mut params = Params::new();
    for header in headers.get_all(COOKIE) {
        let Ok(header) = header.to_str() else {
            continue;
        };
        for pair in header.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    params
                        .entry(name.to_string())
                        .or_insert_with(|| value.trim().trim_matches('"').to_string());
                }
            }
        }
    }
    params
}

fn server_params(parts: &Parts, target: &str, remote: Option<SocketAddr>) -> Params {
    let mut params = Params::new();
    params.insert("REQUEST_METHOD".into(), parts.method.to_string());
    params.insert("REQUEST_URI".into(), target.to_string());
    params.insert(
        "SERVER_PROTOCOL".into(),
        format!("HTTP/{}", protocol(parts.version)),
    );
    if let Some(addr) = remote {
        params.insert("REMOTE_ADDR".into(), addr.ip().to_string());
        params.insert("REMOTE_PORT".into(), addr.port().to_string());
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_request_id_reuse() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, "abc-123".parse().unwrap());
        assert_eq!(RequestId::from_headers(&headers).as_str(), "abc-123");

        headers.insert(X_REQUEST_ID, "has space".parse().unwrap());
        let generated = RequestId::from_headers(&headers);
        assert!(Uuid::parse_str(generated.as_str()).is_ok());
    }

    #[test]
    fn test_environment_from_parts() {
        let parts = parts(
            Request::builder()
                .method("GET")
                .uri("/users/42?expand=posts&page=2")
                .header("Host", "api.example.com:8443")
                .header("Cookie", "session=xyz; theme=\"dark\"")
                .header("Accept", "application/json")
                .body(())
                .unwrap(),
        );
        let remote: SocketAddr = "10.0.0.7:55000".parse().unwrap();
        let env = environment(&parts, Vec::new(), Some(remote), "https");

        assert_eq!(env.method, "GET");
        assert_eq!(env.scheme, "https");
        assert_eq!(env.host, "api.example.com");
        assert_eq!(env.port, Some(8443));
        assert_eq!(env.target, "/users/42?expand=posts&page=2");
        assert_eq!(env.protocol, "1.1");
        assert_eq!(env.query_params["page"], "2");
        assert_eq!(env.cookie_params["session"], "xyz");
        assert_eq!(env.cookie_params["theme"], "dark");
        assert_eq!(env.server_params["REMOTE_ADDR"], "10.0.0.7");
        assert!(env
            .headers
            .iter()
            .any(|(n, v)| n == "accept" && v == "application/json"));
        assert!(env.parsed_body.is_none());
    }

    #[test]
    fn test_form_posts_are_captured() {
        let parts = parts(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(())
                .unwrap(),
        );
        let env = environment(&parts, b"name=Ada+Lovelace&role=admin".to_vec(), None, "http");

        let form = env.parsed_body.unwrap();
        assert_eq!(form["name"], "Ada Lovelace");
        assert_eq!(form["role"], "admin");
        assert_eq!(env.body, b"name=Ada+Lovelace&role=admin");
    }
}

//! Outbound response conversion.
//!
//! # Responsibilities
//! - Copy status and headers from a rendered [`Response`] into an axum response
//! - Turn uncaught errors into `{"error": "<message>"}` responses
//! - Echo the request ID back to the client

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response as AxumResponse};
use serde_json::json;

use crate::http::request::{RequestId, X_REQUEST_ID};
use crate::message::{HttpMessage, Response};

/// Convert `response` with its already rendered `body`.
pub fn into_axum(response: &Response, body: Vec<u8>, request_id: &RequestId) -> AxumResponse {
    let status =
        StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut out = AxumResponse::new(Body::from(body));
    *out.status_mut() = status;

    let headers = out.headers_mut();
    for (name, values) in response.headers().iter() {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            tracing::warn!(header = %name, "Dropping header with invalid name");
            continue;
        };
        for value in values {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.append(name.clone(), value);
                }
                Err(_) => tracing::warn!(header = %name, "Dropping header with invalid value"),
            }
        }
    }
    attach_request_id(&mut out, request_id);
    out
}

/// JSON error body with the given status.
pub fn error_response(status: u16, message: &str, request_id: &RequestId) -> AxumResponse {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({ "error": message }).to_string();
    let mut out = (status, [(CONTENT_TYPE, "application/json")], body).into_response();
    attach_request_id(&mut out, request_id);
    out
}

fn attach_request_id(response: &mut AxumResponse, request_id: &RequestId) {
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(X_REQUEST_ID), value);
    }
}

//! HTTP host adapter driven without a listener.

mod common;

use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use common::{config, empty, read_body, BASE_PATH};
use trellis::http::X_REQUEST_ID;
use trellis::lifecycle::start;
use trellis::HttpServer;

fn server() -> axum::Router {
    HttpServer::new(start(&config()).unwrap()).router()
}

#[tokio::test]
async fn test_serves_html_page() {
    let response = server()
        .oneshot(
            Request::builder()
                .uri(format!("{BASE_PATH}/hello/world"))
                .body(empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/html");
    let id = response.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert_eq!(read_body(response).await, "<h1>Hello world!</h1>");
}

#[tokio::test]
async fn test_underscore_header_names_are_accepted() {
    let response = server()
        .oneshot(
            Request::builder()
                .uri(format!("{BASE_PATH}/hello/world"))
                .header("x_forwarded_for", "10.0.0.1")
                .body(empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await, "<h1>Hello world!</h1>");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let response = server()
        .oneshot(
            Request::builder()
                .uri(format!("{BASE_PATH}/api/users/2"))
                .header(X_REQUEST_ID, "trace-42")
                .body(empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[X_REQUEST_ID], "trace-42");
    assert_eq!(read_body(response).await, r#"{"id":2,"name":"Jane Smith"}"#);
}

#[tokio::test]
async fn test_not_found_and_created() {
    let missing = server()
        .oneshot(Request::builder().uri("/unknown").body(empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_body(missing).await, r#"{"error":"Not Found"}"#);

    let created = server()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("{BASE_PATH}/api/users"))
                .header("content-type", "application/x-www-form-urlencoded")
                .body(axum::body::Body::from("name=Ada"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = config();
    config.server.max_body_bytes = 8;
    let server = HttpServer::new(start(&config).unwrap()).router();

    let response = server
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("{BASE_PATH}/api/users"))
                .body(axum::body::Body::from("a body longer than eight bytes"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(read_body(response).await, r#"{"error":"Request body too large"}"#);
}

#[tokio::test]
async fn test_unsupported_method_is_a_client_error() {
    let response = server()
        .oneshot(
            Request::builder()
                .method("TRACE")
                .uri(format!("{BASE_PATH}/"))
                .body(empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_body(response).await;
    assert!(body.starts_with(r#"{"error":"#), "{body}");
}

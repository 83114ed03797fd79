//! End-to-end dispatch through the bootstrapped kernel.

mod common;

use common::{app, body, get, header, send, BASE_PATH};
use serde_json::{json, Value};
use trellis::message::{Environment, Method, Response, ServerRequest};
use trellis::routing::{Handler, Route, Router};

#[test]
fn test_web_pages() {
    let app = app();

    let home = get(&app, &format!("{BASE_PATH}/"));
    assert_eq!(home.status_code(), 200);
    assert_eq!(header(&home, "Content-Type"), "text/html");
    assert_eq!(body(&home), "<h1>Hello world!</h1>");

    let post = get(&app, &format!("{BASE_PATH}/posts/17"));
    assert_eq!(body(&post), "<h1>Post: 17</h1>");

    let hello = get(&app, &format!("{BASE_PATH}/hello/Grace"));
    assert_eq!(body(&hello), "<h1>Hello Grace!</h1>");
    assert_eq!(header(&hello, "Content-Length"), "21");
}

#[test]
fn test_user_api() {
    let app = app();

    let index = get(&app, &format!("{BASE_PATH}/api/users"));
    assert_eq!(index.status_code(), 200);
    let users: Value = serde_json::from_str(&body(&index)).unwrap();
    assert_eq!(users["1"]["name"], "John Doe");
    assert_eq!(users["2"]["name"], "Jane Smith");

    let show = get(&app, &format!("{BASE_PATH}/api/users/1"));
    assert_eq!(body(&show), r#"{"id":1,"name":"John Doe"}"#);

    let missing = get(&app, &format!("{BASE_PATH}/api/users/3"));
    assert_eq!(missing.status_code(), 404);
    assert_eq!(body(&missing), r#"{"error":"User not found"}"#);

    let created = send(
        &app,
        "POST",
        &format!("{BASE_PATH}/api/users"),
        Some(("application/json", r#"{"name":"Ada"}"#)),
    );
    assert_eq!(created.status_code(), 201);
    assert_eq!(created.reason_phrase(), "Created");
    assert_eq!(body(&created), r#"{"message":"User created successfully"}"#);
}

#[test]
fn test_not_found() {
    let app = app();

    for (method, target) in [
        ("GET", "/nowhere"),
        ("DELETE", "/cts-trellis/api/users/1"),
        ("GET", "/cts-trellis/posts/1/comments"),
    ] {
        let response = send(&app, method, target, None);
        assert_eq!(response.status_code(), 404, "{method} {target}");
        assert_eq!(body(&response), r#"{"error":"Not Found"}"#);
    }
}

#[test]
fn test_encoded_segments_reach_handlers_unchanged() {
    let app = app();

    let spaced = get(&app, &format!("{BASE_PATH}/hello/Ada%20Lovelace"));
    assert_eq!(body(&spaced), "<h1>Hello Ada%20Lovelace!</h1>");

    let percent = get(&app, &format!("{BASE_PATH}/posts/100%25"));
    assert_eq!(body(&percent), "<h1>Post: 100%25</h1>");
}

#[test]
fn test_query_string_is_part_of_the_target() {
    let app = app();
    let response = get(&app, &format!("{BASE_PATH}/api/users?page=2"));
    assert_eq!(response.status_code(), 404);
}

#[test]
fn test_api_route_wraps_plain_values() {
    let router = Router::from_routes([Route::api(
        "/users/{id}",
        Method::Get,
        Handler::function(|params: &[String]| Ok(json!({ "id": params[0] }))),
    )
    .unwrap()]);

    let request = ServerRequest::from_environment(Environment::new("GET", "/users/42")).unwrap();
    let response: Response = router.route(&request).unwrap();
    assert_eq!(response.status_code(), 200);
    assert_eq!(body(&response), r#"{"id":"42"}"#);
}

#[test]
fn test_earlier_route_shadows_later_one() {
    let router = Router::from_routes([
        Route::web(
            "/a/{id}",
            Method::Get,
            Handler::function(|params: &[String]| Ok(format!("h1 {}", params[0]))),
        )
        .unwrap(),
        Route::web("/a/fixed", Method::Get, Handler::function(|_: &[String]| Ok("h2"))).unwrap(),
    ]);

    let request = ServerRequest::from_environment(Environment::new("GET", "/a/fixed")).unwrap();
    assert_eq!(body(&router.route(&request).unwrap()), "h1 fixed");
}

#[test]
fn test_invalid_json_body_is_a_client_error() {
    let router = Router::from_routes([Route::api(
        "/echo",
        Method::Post,
        Handler::function(|_: &[String]| Ok(json!(null))),
    )
    .unwrap()]);

    let mut env = Environment::new("POST", "/echo");
    env.headers.push(("Content-Type".into(), "application/json".into()));
    env.body = b"{not json".to_vec();
    let request = ServerRequest::from_environment(env).unwrap();

    let err = request.parsed_body().unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(router.route(&request).unwrap().status_code(), 200);
}

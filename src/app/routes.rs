//! Route tables for the demo application.
//!
//! Web routes are registered before API routes, so on overlapping templates a web
//! route wins.

use crate::app::controllers::{BaseController, PostController, UserController};
use crate::message::{Method, Response};
use crate::routing::{Handler, Route, RoutingResult};

pub fn web(base: &str) -> RoutingResult<Vec<Route>> {
    Ok(vec![
        Route::web(format!("{base}/"), Method::Get, Handler::action::<BaseController>("index"))?,
        Route::web(
            format!("{base}/posts/{{id}}"),
            Method::Get,
            Handler::action::<PostController>("show"),
        )?,
        Route::web(
            format!("{base}/hello/{{name}}"),
            Method::Get,
            Handler::function(|params: &[String]| {
                let name = params.first().map(String::as_str).unwrap_or_default();
                Response::html(format!("<h1>Hello {name}!</h1>"), 200)
            }),
        )?,
    ])
}

pub fn api(base: &str) -> RoutingResult<Vec<Route>> {
    Ok(vec![
        Route::api(
            format!("{base}/api/users"),
            Method::Get,
            Handler::action::<UserController>("index"),
        )?,
        Route::api(
            format!("{base}/api/users/{{id}}"),
            Method::Get,
            Handler::action::<UserController>("show"),
        )?,
        Route::api(
            format!("{base}/api/users"),
            Method::Post,
            Handler::action::<UserController>("store"),
        )?,
    ])
}

/// Web routes followed by API routes.
pub fn all(base: &str) -> RoutingResult<Vec<Route>> {
    let mut routes = web(base)?;
    routes.extend(api(base)?);
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_prefixed_and_ordered() {
        let routes = all("/cts-trellis").unwrap();
        let paths: Vec<_> = routes.iter().map(|r| (r.path(), r.is_api())).collect();
        assert_eq!(
            paths,
            [
                ("/cts-trellis/", false),
                ("/cts-trellis/posts/{id}", false),
                ("/cts-trellis/hello/{name}", false),
                ("/cts-trellis/api/users", true),
                ("/cts-trellis/api/users/{id}", true),
                ("/cts-trellis/api/users", true),
            ]
        );

        assert_eq!(all("").unwrap()[0].path(), "/");
    }
}

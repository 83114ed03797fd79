//! Demo controllers.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use crate::message::Response;
use crate::routing::{Controller, HandlerResult};

fn param(params: &[String], index: usize) -> &str {
    params.get(index).map(String::as_str).unwrap_or_default()
}

/// Landing page.
#[derive(Debug, Default)]
pub struct BaseController;

impl BaseController {
    pub fn index(&self) -> HandlerResult {
        Ok(Response::html("<h1>Hello world!</h1>", 200)?.into())
    }
}

impl Controller for BaseController {
    fn call(&self, action: &str, _params: &[String]) -> Option<HandlerResult> {
        match action {
            "index" => Some(self.index()),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PostController;

impl PostController {
    pub fn show(&self, id: &str) -> HandlerResult {
        Ok(Response::html(format!("<h1>Post: {id}</h1>"), 200)?.into())
    }
}

impl Controller for PostController {
    fn call(&self, action: &str, params: &[String]) -> Option<HandlerResult> {
        match action {
            "show" => Some(self.show(param(params, 0))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u32,
    pub name: &'static str,
}

/// In-memory user API.
#[derive(Debug)]
pub struct UserController {
    users: BTreeMap<u32, User>,
}

impl Default for UserController {
    fn default() -> Self {
        let users = [(1, "John Doe"), (2, "Jane Smith")]
            .into_iter()
            .map(|(id, name)| (id, User { id, name }))
            .collect();
        Self { users }
    }
}

impl UserController {
    pub fn index(&self) -> HandlerResult {
        Ok(Response::json(&self.users, 200)?.into())
    }

    pub fn show(&self, id: &str) -> HandlerResult {
        let user = id.parse::<u32>().ok().and_then(|id| self.users.get(&id));
        let response = match user {
            Some(user) => Response::json(user, 200)?,
            None => Response::json(&json!({ "error": "User not found" }), 404)?,
        };
        Ok(response.into())
    }

    pub fn store(&self) -> HandlerResult {
        Ok(Response::json(&json!({ "message": "User created successfully" }), 201)?.into())
    }
}

impl Controller for UserController {
    fn call(&self, action: &str, params: &[String]) -> Option<HandlerResult> {
        match action {
            "index" => Some(self.index()),
            "show" => Some(self.show(param(params, 0))),
            "store" => Some(self.store()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::HttpMessage;
    use crate::routing::Outcome;

    fn response(result: Option<HandlerResult>) -> Response {
        match result.unwrap().unwrap() {
            Outcome::Response(response) => response,
            other => panic!("expected a response, got {other:?}"),
        }
    }

    #[test]
    fn test_user_lookup() {
        let controller = UserController::default();

        let found = response(controller.call("show", &["2".into()]));
        assert_eq!(found.status_code(), 200);
        assert_eq!(found.body().to_string_lossy(), r#"{"id":2,"name":"Jane Smith"}"#);

        let missing = response(controller.call("show", &["9".into()]));
        assert_eq!(missing.status_code(), 404);
        assert_eq!(missing.body().to_string_lossy(), r#"{"error":"User not found"}"#);

        let invalid = response(controller.call("show", &["abc".into()]));
        assert_eq!(invalid.status_code(), 404);
    }

    #[test]
    fn test_unknown_action() {
        assert!(PostController.call("delete", &[]).is_none());
        assert!(BaseController.call("show", &[]).is_none());
    }
}

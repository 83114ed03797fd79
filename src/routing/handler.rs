//! Route handlers.
//!
//! # Design Decisions
//! - A handler is either a free function or a controller action; both take the
//!   captured path parameters positionally
//! - Controllers are built fresh with `Default` for every call, never through the container
//! - Handlers may return a finished [`Response`] or a plain value the router wraps

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::message::{MessageError, Response};

/// What a handler produced.
#[derive(Debug)]
pub enum Outcome {
    /// Passed through unchanged.
    Response(Response),
    /// JSON-encoded on API routes, string-coerced elsewhere.
    Value(Value),
    Text(String),
}

impl From<Response> for Outcome {
    fn from(response: Response) -> Self {
        Outcome::Response(response)
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Outcome::Value(value)
    }
}

impl From<String> for Outcome {
    fn from(text: String) -> Self {
        Outcome::Text(text)
    }
}

impl From<&str> for Outcome {
    fn from(text: &str) -> Self {
        Outcome::Text(text.to_string())
    }
}

pub type HandlerResult = Result<Outcome, MessageError>;

/// A group of named actions, instantiated per dispatch.
pub trait Controller: Default + Send + Sync + 'static {
    /// Run `action` with positional path parameters; `None` when the action is unknown.
    fn call(&self, action: &str, params: &[String]) -> Option<HandlerResult>;
}

type HandlerFn = Arc<dyn Fn(&[String]) -> HandlerResult + Send + Sync>;
type ActionFn = fn(&str, &[String]) -> Option<HandlerResult>;

/// Callable attached to a route.
#[derive(Clone)]
pub enum Handler {
    Function(HandlerFn),
    Action {
        controller: &'static str,
        action: &'static str,
        invoke: ActionFn,
    },
}

impl Handler {
    pub fn function<F, O>(f: F) -> Self
    where
        F: Fn(&[String]) -> Result<O, MessageError> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        Handler::Function(Arc::new(move |params| f(params).map(Into::into)))
    }

    /// `action` on a fresh `C::default()`.
    pub fn action<C: Controller>(action: &'static str) -> Self {
        Handler::Action {
            controller: type_name::<C>(),
            action,
            invoke: invoke_action::<C>,
        }
    }

    /// `None` when the handler does not resolve to anything callable.
    pub fn invoke(&self, params: &[String]) -> Option<HandlerResult> {
        match self {
            Handler::Function(f) => Some(f(params)),
            Handler::Action { action, invoke, .. } => invoke(action, params),
        }
    }
}

fn invoke_action<C: Controller>(action: &str, params: &[String]) -> Option<HandlerResult> {
    C::default().call(action, params)
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Function(_) => f.write_str("Function(..)"),
            Handler::Action {
                controller, action, ..
            } => write!(f, "Action({controller}::{action})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Greeter;

    impl Controller for Greeter {
        fn call(&self, action: &str, params: &[String]) -> Option<HandlerResult> {
            match action {
                "greet" => Some(Ok(format!("hi {}", params[0]).into())),
                _ => None,
            }
        }
    }

    #[test]
    fn test_function_handler() {
        let handler = Handler::function(|params: &[String]| Ok(params.join("-")));
        let outcome = handler.invoke(&["a".into(), "b".into()]).unwrap().unwrap();
        assert!(matches!(outcome, Outcome::Text(ref s) if s == "a-b"));
    }

    #[test]
    fn test_action_handler() {
        let handler = Handler::action::<Greeter>("greet");
        let outcome = handler.invoke(&["bob".into()]).unwrap().unwrap();
        assert!(matches!(outcome, Outcome::Text(ref s) if s == "hi bob"));
        assert!(format!("{handler:?}").ends_with("Greeter::greet)"));

        assert!(Handler::action::<Greeter>("missing").invoke(&[]).is_none());
    }
}

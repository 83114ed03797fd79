//! Route definitions and path template compilation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::message::Method;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::handler::Handler;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-zA-Z0-9_]+)\}").expect("static placeholder pattern"));

/// Matches one non-empty path segment.
const SEGMENT: &str = "([^/]+)";

/// A path template bound to a method and handler.
///
/// The template is compiled once here. Literal text matches verbatim; each `{name}`
/// captures one or more characters other than `/`. The whole request target must match.
#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    method: Method,
    handler: Handler,
    is_api: bool,
    pattern: Regex,
    params: Vec<String>,
}

impl Route {
    pub fn new(
        path: impl Into<String>,
        method: Method,
        handler: Handler,
        is_api: bool,
    ) -> RoutingResult<Self> {
        let path = path.into();
        let (pattern, params) = compile(&path)?;
        Ok(Self {
            path,
            method,
            handler,
            is_api,
            pattern,
            params,
        })
    }

    pub fn web(path: impl Into<String>, method: Method, handler: Handler) -> RoutingResult<Self> {
        Self::new(path, method, handler, false)
    }

    /// Non-response handler results are JSON-encoded.
    pub fn api(path: impl Into<String>, method: Method, handler: Handler) -> RoutingResult<Self> {
        Self::new(path, method, handler, true)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn is_api(&self) -> bool {
        self.is_api
    }

    /// Placeholder names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// Captured placeholder values in declaration order, or `None` if `target` does not match.
    pub fn captures(&self, target: &str) -> Option<Vec<String>> {
        let caps = self.pattern.captures(target)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }
}

fn compile(template: &str) -> RoutingResult<(Regex, Vec<String>)> {
    let mut pattern = String::from("^");
    let mut params = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        pattern.push_str(&regex::escape(&template[last..whole.start()]));
        pattern.push_str(SEGMENT);
        params.push(name.as_str().to_string());
        last = whole.end();
    }
    pattern.push_str(&regex::escape(&template[last..]));
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(|source| RoutingError::Template {
        template: template.to_string(),
        source,
    })?;
    Ok((regex, params))
}

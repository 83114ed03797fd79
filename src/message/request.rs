//! Outgoing/generic request values.

use std::fmt;
use std::str::FromStr;

use crate::message::error::{MessageError, MessageResult};
use crate::message::message::{HttpMessage, Message};
use crate::message::uri::Uri;

/// Supported request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
        }
    }
}

impl FromStr for Method {
    type Err = MessageError;

    /// Case-insensitive; the input is normalized to upper case first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            "HEAD" => Ok(Method::Head),
            other => Err(MessageError::Method(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request: method, target and URI on top of the shared message.
#[derive(Debug, Clone)]
pub struct Request {
    message: Message,
    method: Method,
    request_target: Option<String>,
    uri: Uri,
}

impl Request {
    pub fn new(method: Method, uri: Uri, message: Message) -> Self {
        Self {
            message,
            method,
            request_target: None,
            uri,
        }
    }
}

/// Request accessors and transformations, available on every request-like value.
pub trait HttpRequest: HttpMessage {
    fn request(&self) -> &Request;

    fn request_mut(&mut self) -> &mut Request;

    fn method(&self) -> Method {
        self.request().method
    }

    fn uri(&self) -> &Uri {
        &self.request().uri
    }

    /// Explicit target if one was set, else the URI's encoded `path[?query]`, else `/`.
    fn request_target(&self) -> String {
        let request = self.request();
        if let Some(target) = &request.request_target {
            return target.clone();
        }
        let mut target = request.uri.path();
        let query = request.uri.query();
        if !query.is_empty() {
            target.push('?');
            target.push_str(&query);
        }
        if target.is_empty() {
            target.push('/');
        }
        target
    }

    fn with_request_target(&self, target: &str) -> MessageResult<Self> {
        if target.chars().any(char::is_whitespace) {
            return Err(MessageError::Request(
                "The request target cannot contain whitespace.".into(),
            ));
        }
        let mut next = self.clone();
        next.request_mut().request_target = Some(target.to_string());
        Ok(next)
    }

    fn with_method(&self, method: &str) -> MessageResult<Self> {
        let method: Method = method.parse()?;
        let mut next = self.clone();
        next.request_mut().method = method;
        Ok(next)
    }

    /// Swap the URI. The `Host` header follows the new host unless `preserve_host`
    /// is set or the new URI has no host.
    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        let mut next = self.clone();
        if !preserve_host && !uri.host().is_empty() {
            let host = match uri.port() {
                Some(port) => format!("{}:{port}", uri.host()),
                None => uri.host().to_string(),
            };
            next.message_mut().headers_mut().set_unchecked("host", vec![host]);
        }
        next.request_mut().uri = uri;
        next
    }
}

impl HttpMessage for Request {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

impl HttpRequest for Request {
    fn request(&self) -> &Request {
        self
    }

    fn request_mut(&mut self) -> &mut Request {
        self
    }
}

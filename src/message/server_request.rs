//! Server-side request values.
//!
//! # Responsibilities
//! - Snapshot server/query/cookie params, parsed form data and uploads at construction
//! - Decode the body lazily by Content-Type when no form data was captured
//! - Carry a per-request attribute bag, changed only through copy-on-write
//!
//! # Design Decisions
//! - All environment input arrives through an explicit [`Environment`] value;
//!   nothing is read from process state

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::message::error::{MessageError, MessageResult};
use crate::message::headers::HeaderMap;
use crate::message::message::{HttpMessage, Message};
use crate::message::request::{HttpRequest, Method, Request};
use crate::message::stream::Stream;
use crate::message::uploaded_file::UploadedFile;
use crate::message::uri::{percent_decode, Uri, UriParts};

/// String-keyed parameter snapshot.
pub type Params = BTreeMap<String, String>;

/// Value stored in the attribute bag.
pub type Attribute = Arc<dyn Any + Send + Sync>;

/// Everything the hosting environment knows about one inbound request.
#[derive(Debug, Clone)]
pub struct Environment {
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    /// `path[?query]` as received, still percent-encoded.
    pub target: String,
    /// `HTTP/1.1` or bare `1.1`.
    pub protocol: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub server_params: Params,
    pub query_params: Params,
    pub cookie_params: Params,
    pub parsed_body: Option<Value>,
    pub uploaded_files: BTreeMap<String, UploadedFile>,
}

impl Environment {
    /// Minimal HTTP/1.1 request to `http://localhost{target}`.
    pub fn new(method: &str, target: &str) -> Self {
        Self {
            method: method.to_string(),
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: None,
            target: target.to_string(),
            protocol: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
            server_params: Params::new(),
            query_params: Params::new(),
            cookie_params: Params::new(),
            parsed_body: None,
            uploaded_files: BTreeMap::new(),
        }
    }
}

/// An inbound request as seen by the application.
#[derive(Clone)]
pub struct ServerRequest {
    request: Request,
    server_params: Params,
    query_params: Params,
    parsed_body: Option<Value>,
    cookie_params: Params,
    uploaded_files: BTreeMap<String, UploadedFile>,
    attributes: HashMap<String, Attribute>,
}

impl ServerRequest {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            server_params: Params::new(),
            query_params: Params::new(),
            parsed_body: None,
            cookie_params: Params::new(),
            uploaded_files: BTreeMap::new(),
            attributes: HashMap::new(),
        }
    }

    /// Assemble a request from environment input, validating every part.
    pub fn from_environment(env: Environment) -> MessageResult<Self> {
        let (path, query) = match env.target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (env.target.as_str(), ""),
        };
        let uri = Uri::from_parts(UriParts {
            scheme: env.scheme.clone(),
            host: env.host.clone(),
            port: env.port,
            path: percent_decode(path),
            query: percent_decode(query),
            fragment: String::new(),
        })?;

        let version = env
            .protocol
            .strip_prefix("HTTP/")
            .unwrap_or(&env.protocol);
        let headers = HeaderMap::from_received(env.headers)?;
        let body = Arc::new(Stream::from_bytes(env.body));
        let message = Message::new(version, headers, body)?;
        let method: Method = env.method.parse()?;

        Ok(Self {
            server_params: env.server_params,
            query_params: env.query_params,
            parsed_body: env.parsed_body,
            cookie_params: env.cookie_params,
            uploaded_files: env.uploaded_files,
            ..Self::new(Request::new(method, uri, message))
        })
    }

    pub fn server_params(&self) -> &Params {
        &self.server_params
    }

    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    pub fn cookie_params(&self) -> &Params {
        &self.cookie_params
    }

    pub fn uploaded_files(&self) -> &BTreeMap<String, UploadedFile> {
        &self.uploaded_files
    }

    /// Captured form data if present, else the body decoded by Content-Type.
    ///
    /// JSON bodies that fail to parse yield [`MessageError::InvalidJson`] (400).
    /// Content types other than JSON and url-encoded forms yield `None`.
    pub fn parsed_body(&self) -> MessageResult<Option<Value>> {
        if let Some(body) = self.parsed_body.as_ref().filter(|b| !is_blank(b)) {
            return Ok(Some(body.clone()));
        }

        let content_type = self.header_line("Content-Type");
        if content_type.contains("application/json") {
            let raw = self.read_body()?;
            return serde_json::from_slice(&raw)
                .map(Some)
                .map_err(MessageError::InvalidJson);
        }
        if content_type.contains("application/x-www-form-urlencoded") {
            let raw = self.read_body()?;
            let form: Map<String, Value> = url::form_urlencoded::parse(&raw)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            return Ok(Some(Value::Object(form)));
        }
        Ok(None)
    }

    pub fn attributes(&self) -> &HashMap<String, Attribute> {
        &self.attributes
    }

    /// Typed attribute lookup; `None` when absent or of another type.
    pub fn attribute<T: Any>(&self, name: &str) -> Option<&T> {
        self.attributes.get(name)?.downcast_ref::<T>()
    }

    pub fn attribute_or<T: Any + Clone>(&self, name: &str, default: T) -> T {
        self.attribute::<T>(name).cloned().unwrap_or(default)
    }

    pub fn with_attribute<T: Any + Send + Sync>(&self, name: &str, value: T) -> Self {
        let mut next = self.clone();
        next.attributes.insert(name.to_string(), Arc::new(value));
        next
    }

    pub fn without_attribute(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.attributes.remove(name);
        next
    }

    pub fn with_query_params(&self, query: Params) -> Self {
        Self {
            query_params: query,
            ..self.clone()
        }
    }

    pub fn with_parsed_body(&self, data: Option<Value>) -> Self {
        Self {
            parsed_body: data,
            ..self.clone()
        }
    }

    pub fn with_cookie_params(&self, cookies: Params) -> Self {
        Self {
            cookie_params: cookies,
            ..self.clone()
        }
    }

    pub fn with_uploaded_files(&self, files: BTreeMap<String, UploadedFile>) -> Self {
        Self {
            uploaded_files: files,
            ..self.clone()
        }
    }

    fn read_body(&self) -> MessageResult<Vec<u8>> {
        let body = self.body();
        if body.is_seekable() {
            body.rewind()?;
        }
        body.contents()
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

impl fmt::Debug for ServerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRequest")
            .field("request", &self.request)
            .field("server_params", &self.server_params)
            .field("query_params", &self.query_params)
            .field("parsed_body", &self.parsed_body)
            .field("cookie_params", &self.cookie_params)
            .field("uploaded_files", &self.uploaded_files)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HttpMessage for ServerRequest {
    fn message(&self) -> &Message {
        self.request.message()
    }

    fn message_mut(&mut self) -> &mut Message {
        self.request.message_mut()
    }
}

impl HttpRequest for ServerRequest {
    fn request(&self) -> &Request {
        &self.request
    }

    fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }
}

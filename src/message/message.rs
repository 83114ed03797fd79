//! Shared message state and the copy-on-write accessor trait.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::message::error::{MessageError, MessageResult};
use crate::message::headers::{HeaderMap, IntoHeaderValues};
use crate::message::stream::Stream;

static PROTOCOL_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+$").expect("static protocol version pattern"));

/// Protocol version, headers and body common to requests and responses.
///
/// The body is shared by reference between a message and every value derived from it,
/// until a `with_body` call swaps it.
#[derive(Debug, Clone)]
pub struct Message {
    protocol_version: String,
    headers: HeaderMap,
    body: Arc<Stream>,
}

impl Message {
    pub fn new(protocol_version: &str, headers: HeaderMap, body: Arc<Stream>) -> MessageResult<Self> {
        validate_protocol_version(protocol_version)?;
        Ok(Self {
            protocol_version: protocol_version.to_string(),
            headers,
            body,
        })
    }

    /// HTTP/1.1 message with no headers and an empty in-memory body.
    pub fn empty() -> Self {
        Self {
            protocol_version: "1.1".to_string(),
            headers: HeaderMap::new(),
            body: Arc::new(Stream::from_bytes(Vec::new())),
        }
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

/// Read access and `with_*` transformations shared by every message value.
///
/// Each `with_*` validates first and returns a new value; `self` is never modified.
pub trait HttpMessage: Clone {
    fn message(&self) -> &Message;

    fn message_mut(&mut self) -> &mut Message;

    fn protocol_version(&self) -> &str {
        &self.message().protocol_version
    }

    fn headers(&self) -> &HeaderMap {
        &self.message().headers
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }

    fn header(&self, name: &str) -> &[String] {
        self.headers().get(name)
    }

    fn header_line(&self, name: &str) -> String {
        self.headers().line(name)
    }

    fn body(&self) -> &Arc<Stream> {
        &self.message().body
    }

    fn with_protocol_version(&self, version: &str) -> MessageResult<Self> {
        validate_protocol_version(version)?;
        let mut next = self.clone();
        next.message_mut().protocol_version = version.to_string();
        Ok(next)
    }

    /// Replace all values of `name`.
    fn with_header(&self, name: &str, values: impl IntoHeaderValues) -> MessageResult<Self> {
        let headers = self.headers().with(name, values.into_header_values())?;
        let mut next = self.clone();
        next.message_mut().headers = headers;
        Ok(next)
    }

    /// Append to the values of `name`, creating it when absent.
    fn with_added_header(&self, name: &str, values: impl IntoHeaderValues) -> MessageResult<Self> {
        let headers = self.headers().with_added(name, values.into_header_values())?;
        let mut next = self.clone();
        next.message_mut().headers = headers;
        Ok(next)
    }

    fn without_header(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.message_mut().headers = self.headers().without(name);
        next
    }

    fn with_body(&self, body: Arc<Stream>) -> Self {
        let mut next = self.clone();
        next.message_mut().body = body;
        next
    }
}

impl HttpMessage for Message {
    fn message(&self) -> &Message {
        self
    }

    fn message_mut(&mut self) -> &mut Message {
        self
    }
}

fn validate_protocol_version(version: &str) -> MessageResult<()> {
    if !PROTOCOL_VERSION.is_match(version) {
        return Err(MessageError::Message(format!(
            "The HTTP protocol version {version} is invalid."
        )));
    }
    Ok(())
}

//! Response values.
//!
//! # Design Decisions
//! - For any status other than 200/201/204, the supplied content doubles as the reason
//!   phrase (falling back to the standard phrase when empty) and as the body
//! - `Content-Type` and `Content-Length` are synthesized at construction
//! - Rendering rewinds the body and copies it out in bounded chunks

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::message::error::{MessageError, MessageResult};
use crate::message::message::{HttpMessage, Message};
use crate::message::stream::Stream;

/// Chunk size used by [`Response::render`].
pub const RENDER_CHUNK_SIZE: usize = 8192;

/// Standard reason phrase for `code`, empty when unknown.
pub fn default_reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        419 => "Request Expired",
        422 => "Unprocessable Content",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

fn is_success(code: u16) -> bool {
    matches!(code, 200 | 201 | 204)
}

fn validate_status(code: u16) -> MessageResult<()> {
    if !(100..=599).contains(&code) {
        return Err(MessageError::Response(format!("Invalid HTTP status code {code}.")));
    }
    Ok(())
}

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    status: u16,
    reason_phrase: String,
}

impl Response {
    pub fn new(content: impl Into<String>, status: u16, content_type: &str) -> MessageResult<Self> {
        validate_status(status)?;
        let content = content.into();

        let (payload, reason_phrase) = if is_success(status) {
            (content, String::new())
        } else {
            let reason = if content.is_empty() {
                default_reason_phrase(status).to_string()
            } else {
                content
            };
            (reason.clone(), reason)
        };

        let body = Stream::temp("w+b")?;
        body.write(payload.as_bytes())?;

        let mut message = Message::empty().with_body(Arc::new(body));
        let headers = message
            .headers()
            .with("Content-Type", vec![content_type.to_string()])?
            .with("Content-Length", vec![payload.len().to_string()])?;
        *message.headers_mut() = headers;

        Ok(Self {
            message,
            status,
            reason_phrase,
        })
    }

    /// `text/html` response.
    pub fn html(content: impl Into<String>, status: u16) -> MessageResult<Self> {
        Self::new(content, status, "text/html")
    }

    /// `application/json` response holding the serialized `value`.
    pub fn json<T: Serialize + ?Sized>(value: &T, status: u16) -> MessageResult<Self> {
        let content = serde_json::to_string(value)
            .map_err(|e| MessageError::Response(format!("The body could not be encoded: {e}")))?;
        Self::new(content, status, "application/json")
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn reason_phrase(&self) -> &str {
        if self.reason_phrase.is_empty() {
            default_reason_phrase(self.status)
        } else {
            &self.reason_phrase
        }
    }

    /// New response with `code`; an empty `reason` selects the standard phrase.
    pub fn with_status(&self, code: u16, reason: &str) -> MessageResult<Self> {
        validate_status(code)?;
        let mut next = self.clone();
        next.status = code;
        next.reason_phrase = if reason.is_empty() {
            default_reason_phrase(code).to_string()
        } else {
            reason.to_string()
        };
        Ok(next)
    }

    /// Rewind the body and copy it to `out`.
    pub fn render<W: Write>(&self, out: &mut W) -> MessageResult<()> {
        self.render_with_chunk_size(out, RENDER_CHUNK_SIZE)
    }

    pub fn render_with_chunk_size<W: Write>(&self, out: &mut W, chunk_size: usize) -> MessageResult<()> {
        let body = self.body();
        if body.is_seekable() {
            body.rewind()?;
        }
        while !body.eof() {
            let chunk = body.read(chunk_size)?;
            if chunk.is_empty() {
                break;
            }
            out.write_all(&chunk).map_err(MessageError::StreamIo)?;
        }
        out.flush().map_err(MessageError::StreamIo)
    }
}

impl HttpMessage for Response {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

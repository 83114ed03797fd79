//! HTTP message value model.
//!
//! # Data Flow
//! ```text
//! Environment (from the host adapter)
//!     → server_request.rs (snapshot params, build Uri + headers + body Stream)
//!     → with_* transformations (each returns a new value)
//!     → router produces a Response
//!     → response.rs render (rewind body, copy out in chunks)
//! ```
//!
//! # Design Decisions
//! - Values are never mutated in place; `with_*` validates, then builds a copy
//! - Bodies are shared by `Arc<Stream>` across copies until explicitly replaced
//! - Uri stores raw components and percent-encodes on read

pub mod error;
pub mod factory;
pub mod headers;
#[allow(clippy::module_inception)]
pub mod message;
pub mod request;
pub mod response;
pub mod server_request;
pub mod stream;
pub mod uploaded_file;
pub mod uri;

pub use error::{MessageError, MessageResult};
pub use factory::{
    ResponseFactory, ServerRequestFactory, StreamFactory, UploadedFileFactory, UriFactory,
};
pub use headers::HeaderMap;
pub use message::{HttpMessage, Message};
pub use request::{HttpRequest, Method, Request};
pub use response::Response;
pub use server_request::{Environment, Params, ServerRequest};
pub use stream::Stream;
pub use uploaded_file::{UploadStatus, UploadedFile};
pub use uri::Uri;

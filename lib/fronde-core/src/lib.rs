//! Core types and traits for the fronde HTTP request builder.
//!
//! This crate provides the foundational pieces assembled by `fronde`:
//! - [`Method`] - HTTP method enum
//! - [`Request`] - concrete outgoing request
//! - [`Response`] and [`RawResponse`] - response head snapshot and body stream
//! - [`BodyProvider`] - pluggable request body strategies
//! - [`ResponseDecoder`] - pluggable response decoding, [`JsonDecoder`] default
//! - [`QuerySource`] and [`merge_query`] - query string aggregation
//! - [`Tracer`] and [`TracedBody`] - body lifecycle hooks
//! - [`CancelToken`] - cancellation with a recorded cause
//! - [`Transport`] - the send capability boundary
//! - [`Error`] and [`Result`] - error handling
//! - [`StatusCode`] and [`header`] - re-exported from the `http` crate

mod body;
mod cancel;
mod decode;
mod error;
mod method;
pub mod prelude;
mod query;
mod request;
mod response;
mod trace;
mod transport;

pub use body::{BodyProvider, ContentType, FormBody, JsonBody, RawBody, from_json, to_form, to_json};
pub use cancel::{CancelToken, Cancelled};
pub use decode::{JsonDecoder, ResponseDecoder};
pub use error::{Error, Result, body_excerpt};
pub use method::Method;
pub use query::{QuerySource, merge_query, to_query_pairs};
pub use request::Request;
pub use response::{BodyStream, RawResponse, Response, read_body};
pub use trace::{TracedBody, Tracer};
pub use transport::{Transport, TransportFuture};

// Re-export http crate types for status codes and headers
pub use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version, header};

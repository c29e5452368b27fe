//! Composable HTTP request builder and sender.
//!
//! A [`Fronde`] accumulates method, URL, headers, query parameters, and a
//! body encoding, then materializes concrete requests and sends them with
//! typed response decoding split by success/failure status. Cloning a
//! builder branches a shared base configuration without mutation leaking
//! between branches.
//!
//! # Example
//!
//! ```ignore
//! use fronde::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct Issue {
//!     id: u64,
//!     title: String,
//! }
//!
//! let api = Fronde::new().base("https://api.example.com/");
//!
//! let (_, issue) = api
//!     .clone()
//!     .get("issues/42")
//!     .receive_success::<Issue>()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
pub mod middleware;
pub mod prelude;

pub use builder::{Fronde, Reply};
pub use client::{BoxedService, HyperTransport, ServiceTransport};
pub use config::{ClientConfig, ClientConfigBuilder};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use fronde_core::{
    BodyProvider, BodyStream, CancelToken, ContentType, Error, FormBody, JsonBody, JsonDecoder,
    Method, QuerySource, RawBody, RawResponse, Request, Response, ResponseDecoder, Result,
    TracedBody, Tracer, Transport, TransportFuture, body_excerpt, from_json, merge_query,
    read_body, to_form, to_json, to_query_pairs,
};

// Re-export http types for status codes and headers
pub use fronde_core::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version, header};

// Re-export url for request inspection
pub use url;

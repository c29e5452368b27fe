//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fronde::prelude::*;
//! ```

pub use crate::{
    BodyProvider, CancelToken, ContentType, Error, Fronde, HyperTransport, JsonDecoder, Method,
    RawResponse, Reply, Request, Response, ResponseDecoder, Result, ServiceTransport, Tracer,
    Transport,
};

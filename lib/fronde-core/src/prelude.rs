//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fronde_core::prelude::*;
//! ```

pub use crate::{
    BodyProvider, CancelToken, ContentType, Error, FormBody, JsonBody, JsonDecoder, Method,
    RawBody, RawResponse, Request, Response, ResponseDecoder, Result, Tracer, Transport,
    from_json, to_form, to_json,
};

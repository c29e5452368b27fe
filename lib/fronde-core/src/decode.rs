//! Response decoding.

use bytes::Bytes;
use http::StatusCode;

use crate::{Error, Result, from_json};

/// Strategy turning a completed response body into a typed value.
///
/// The decoder is generic over the destination type, so it is carried as a
/// builder type parameter rather than a trait object; swapping in a custom
/// decoder changes the builder's decoder parameter.
pub trait ResponseDecoder: Clone + Send + Sync {
    /// Decode the buffered body of a response with the given status.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be decoded into `T`.
    fn decode<T: serde::de::DeserializeOwned>(&self, status: StatusCode, body: &Bytes)
    -> Result<T>;
}

/// Default decoder: deserializes the full body as JSON.
///
/// Failures are wrapped with the response status and a bounded excerpt of
/// the raw body, so diagnostics stay useful without buffering huge error
/// bodies into messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl ResponseDecoder for JsonDecoder {
    fn decode<T: serde::de::DeserializeOwned>(
        &self,
        status: StatusCode,
        body: &Bytes,
    ) -> Result<T> {
        from_json(body).map_err(|err| Error::decode(status.as_u16(), body, err.to_string()))
    }
}

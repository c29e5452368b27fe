//! Request body providers and serialization utilities.
//!
//! A [`BodyProvider`] produces the request body bytes plus an optional
//! content type. Providers are attached to a builder and only materialized
//! when a concrete request is built, so serialization failures surface at
//! build time rather than configuration time.

use bytes::Bytes;

use crate::Result;

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
    /// Plain text content type (`text/plain`).
    PlainText,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strategy producing a request body and its content type.
///
/// At most one provider is active on a builder at a time; assigning a new
/// one replaces the previous provider (last wins, no diagnostic).
pub trait BodyProvider: Send + Sync {
    /// Content type to set on the request, or `None` to leave the
    /// `Content-Type` header untouched.
    fn content_type(&self) -> Option<ContentType>;

    /// Materialize the body bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serializing the payload fails.
    fn body(&self) -> Result<Bytes>;
}

/// Body provider wrapping caller-supplied bytes verbatim.
///
/// Declares no content type; set one manually on the builder if desired.
#[derive(Debug, Clone)]
pub struct RawBody {
    body: Bytes,
}

impl RawBody {
    /// Wrap the given bytes as a request body.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }
}

impl BodyProvider for RawBody {
    fn content_type(&self) -> Option<ContentType> {
        None
    }

    fn body(&self) -> Result<Bytes> {
        Ok(self.body.clone())
    }
}

/// Body provider serializing a payload to JSON.
#[derive(Debug, Clone)]
pub struct JsonBody<T> {
    payload: T,
}

impl<T> JsonBody<T> {
    /// Wrap the given payload for JSON encoding.
    pub const fn new(payload: T) -> Self {
        Self { payload }
    }
}

impl<T> BodyProvider for JsonBody<T>
where
    T: serde::Serialize + Send + Sync,
{
    fn content_type(&self) -> Option<ContentType> {
        Some(ContentType::Json)
    }

    fn body(&self) -> Result<Bytes> {
        to_json(&self.payload)
    }
}

/// Body provider serializing a payload to form URL-encoded bytes.
///
/// Accepts either a structured value or raw pairs: `Vec<(String, String)>`
/// serializes as repeated form fields.
#[derive(Debug, Clone)]
pub struct FormBody<T> {
    payload: T,
}

impl<T> FormBody<T> {
    /// Wrap the given payload for form URL-encoding.
    pub const fn new(payload: T) -> Self {
        Self { payload }
    }
}

impl<T> BodyProvider for FormBody<T>
where
    T: serde::Serialize + Send + Sync,
{
    fn content_type(&self) -> Option<ContentType> {
        Some(ContentType::FormUrlEncoded)
    }

    fn body(&self) -> Result<Bytes> {
        to_form(&self.payload)
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to form URL-encoded bytes.
///
/// Uses `serde_html_form` which supports `Vec<T>` for repeated form fields
/// (e.g., `tags=a&tags=b&tags=c`).
///
/// # Errors
///
/// Returns an error if form serialization fails.
pub fn to_form<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_html_form::to_string(value)
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so failures name the exact field path that
/// could not be deserialized (e.g., "user.address.city").
///
/// # Errors
///
/// Returns an error if JSON deserialization fails.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

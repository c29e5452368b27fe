//! Error types for fronde.

use derive_more::{Display, Error, From};

/// Maximum number of raw body bytes included in error messages.
const MAX_EXCERPT_BYTES: usize = 100;

/// Marker appended to a body excerpt that was cut at [`MAX_EXCERPT_BYTES`].
const TRUNCATION_MARKER: &str = " (truncated)";

/// Main error type for fronde operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Non-success HTTP status with nothing to decode into.
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The request was canceled, possibly with a recorded cause.
    #[display("request canceled: {}", cause.as_deref().unwrap_or("operation canceled"))]
    #[from(skip)]
    Cancelled {
        /// Cause recorded on the cancellation token, if any.
        cause: Option<String>,
    },

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Form URL-encoded body serialization error.
    #[display("form serialization error: {_0}")]
    #[from]
    FormSerialization(serde_html_form::ser::Error),

    /// Structured query serialization error.
    #[display("query serialization error: {_0}")]
    #[from(skip)]
    QuerySerialization(serde_html_form::ser::Error),

    /// Malformed query string on the request URL.
    #[display("malformed query string: {_0}")]
    #[from(skip)]
    QueryParse(#[error(not(source))] String),

    /// Response body read or deserialization failure.
    #[display("decode error for status {status}: {message}, got body: {excerpt}")]
    #[from(skip)]
    Decode {
        /// HTTP status code of the response being decoded.
        status: u16,
        /// Bounded excerpt of the raw body.
        excerpt: String,
        /// Underlying read/parse error message.
        message: String,
    },

    /// Body trace hook failure.
    #[display("trace error: {_0}")]
    #[from(skip)]
    Trace(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create a bare cancellation error (no recorded cause).
    #[must_use]
    pub const fn cancelled() -> Self {
        Self::Cancelled { cause: None }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a malformed query string error.
    #[must_use]
    pub fn query_parse(message: impl Into<String>) -> Self {
        Self::QueryParse(message.into())
    }

    /// Create a decode error carrying a bounded body excerpt.
    #[must_use]
    pub fn decode(status: u16, body: &[u8], message: impl Into<String>) -> Self {
        Self::Decode {
            status,
            excerpt: body_excerpt(body),
            message: message.into(),
        }
    }

    /// Create a trace hook error.
    #[must_use]
    pub fn trace(message: impl Into<String>) -> Self {
        Self::Trace(message.into())
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if this is a cancellation error.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns the HTTP status code if this error carries one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Returns `Some(Ok(value))` if the error has a body and it deserializes
    /// successfully, `Some(Err(error))` if the body exists but deserialization
    /// fails, or `None` if there is no body or this is not an HTTP error.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}

/// Bounded excerpt of a raw response body for error messages.
///
/// Returns the whole body (lossy UTF-8) when it fits in the cap, otherwise
/// the capped prefix followed by a truncation marker.
#[must_use]
pub fn body_excerpt(body: &[u8]) -> String {
    if body.len() <= MAX_EXCERPT_BYTES {
        String::from_utf8_lossy(body).into_owned()
    } else {
        let head = body.get(..MAX_EXCERPT_BYTES).unwrap_or(body);
        format!("{}{TRUNCATION_MARKER}", String::from_utf8_lossy(head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::http(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP error 404: Not Found");

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "connection error: failed to connect");

        let err = Error::json_deserialization("user.address.city", "missing field `city`");
        assert_eq!(
            err.to_string(),
            "JSON deserialization error at 'user.address.city': missing field `city`"
        );
    }

    #[test]
    fn error_cancelled_display() {
        let err = Error::cancelled();
        assert_eq!(err.to_string(), "request canceled: operation canceled");

        let err = Error::Cancelled {
            cause: Some("deadline budget exhausted".to_string()),
        };
        assert_eq!(err.to_string(), "request canceled: deadline budget exhausted");
    }

    #[test]
    fn error_status() {
        let err = Error::http(404, "Not Found");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = Error::decode(502, b"oops", "bad json");
        assert_eq!(err.status(), Some(502));
        assert!(err.is_server_error());

        let err = Error::Timeout;
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn error_body() {
        let err = Error::http(404, "Not Found");
        assert!(err.body().is_none());

        let body = bytes::Bytes::from(r#"{"error": "not found"}"#);
        let err = Error::http_with_body(404, "Not Found", body.clone());
        assert_eq!(err.body(), Some(&body));
    }

    #[test]
    fn error_decode_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct ApiError {
            error: String,
        }

        let body = bytes::Bytes::from(r#"{"error": "not found"}"#);
        let err = Error::http_with_body(404, "Not Found", body);

        let decoded = err
            .decode_body::<ApiError>()
            .expect("should have body")
            .expect("should decode");
        assert_eq!(
            decoded,
            ApiError {
                error: "not found".to_string()
            }
        );

        assert!(Error::Timeout.decode_body::<ApiError>().is_none());
    }

    #[test]
    fn excerpt_short_body_is_verbatim() {
        let body = vec![b'x'; 50];
        assert_eq!(body_excerpt(&body), "x".repeat(50));
    }

    #[test]
    fn excerpt_exact_cap_has_no_marker() {
        let body = vec![b'x'; 100];
        assert_eq!(body_excerpt(&body), "x".repeat(100));
    }

    #[test]
    fn excerpt_long_body_is_capped_and_marked() {
        let body = vec![b'y'; 150];
        let excerpt = body_excerpt(&body);
        assert_eq!(excerpt, format!("{} (truncated)", "y".repeat(100)));
    }
}

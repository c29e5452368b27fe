//! HTTP response types.
//!
//! A transport hands back a [`RawResponse`]: an immutable [`Response`] head
//! snapshot plus a [`BodyStream`]. The two are split so the body's
//! lifecycle (reading, draining, tracing, closing) can be managed
//! independently of the snapshot, which never includes body data.

use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use http::{HeaderMap, StatusCode, Version, header};

use crate::Result;

/// A response body: chunks of bytes arriving over time.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Immutable snapshot of a response's status line, protocol version,
/// headers, and declared content length — everything except the body.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    content_length: Option<u64>,
}

impl Response {
    /// Capture a snapshot from status, version, and headers.
    ///
    /// The declared content length is read from the `Content-Length` header;
    /// `None` means the length is unknown (e.g., chunked transfer).
    #[must_use]
    pub fn new(status: StatusCode, version: Version, headers: HeaderMap) -> Self {
        let content_length = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok());
        Self {
            status,
            version,
            headers,
            content_length,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Protocol version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First header value by name, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Declared content length, `None` when unknown.
    #[must_use]
    pub const fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Status is 3xx.
    #[must_use]
    pub fn is_redirection(&self) -> bool {
        self.status.is_redirection()
    }

    /// Status is 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Status is 5xx.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

/// A response as produced by a transport: head snapshot plus body stream.
pub struct RawResponse {
    head: Response,
    body: BodyStream,
}

impl RawResponse {
    /// Pair a head snapshot with a body stream.
    #[must_use]
    pub fn new(head: Response, body: BodyStream) -> Self {
        Self { head, body }
    }

    /// Build a response whose body is a single buffered chunk.
    ///
    /// Mainly useful for transport stubs in tests.
    #[must_use]
    pub fn buffered(head: Response, body: Bytes) -> Self {
        let body: BodyStream = Box::pin(futures_util::stream::iter([Ok(body)]));
        Self { head, body }
    }

    /// The head snapshot.
    #[must_use]
    pub const fn head(&self) -> &Response {
        &self.head
    }

    /// Consume into (head, body).
    #[must_use]
    pub fn into_parts(self) -> (Response, BodyStream) {
        (self.head, self.body)
    }
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse")
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

/// Read a body stream to the end, buffering all chunks.
///
/// # Errors
///
/// Returns the first chunk error encountered.
pub async fn read_body<S>(mut body: S) -> Result<Bytes>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    let mut collected = Vec::new();
    while let Some(chunk) = body.next().await {
        collected.extend_from_slice(&chunk?);
    }
    Ok(Bytes::from(collected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(status: u16, content_length: Option<&str>) -> Response {
        let mut headers = HeaderMap::new();
        if let Some(length) = content_length {
            headers.insert(
                header::CONTENT_LENGTH,
                length.parse().expect("header value"),
            );
        }
        Response::new(
            StatusCode::from_u16(status).expect("status"),
            Version::HTTP_11,
            headers,
        )
    }

    #[test]
    fn response_snapshot() {
        let response = head(200, Some("12"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.version(), Version::HTTP_11);
        assert_eq!(response.content_length(), Some(12));
        assert!(response.is_success());
    }

    #[test]
    fn response_unknown_content_length() {
        let response = head(200, None);
        assert_eq!(response.content_length(), None);
    }

    #[test]
    fn response_status_classes() {
        assert!(head(301, None).is_redirection());
        assert!(head(404, None).is_client_error());
        assert!(head(500, None).is_server_error());
    }

    #[tokio::test]
    async fn read_body_collects_chunks() {
        let chunks = [
            Ok(Bytes::from_static(b"foo ")),
            Ok(Bytes::from_static(b"bar")),
        ];
        let body: BodyStream = Box::pin(futures_util::stream::iter(chunks));

        let collected = read_body(body).await.expect("read");
        assert_eq!(collected.as_ref(), b"foo bar");
    }

    #[tokio::test]
    async fn read_body_propagates_chunk_error() {
        let chunks = [
            Ok(Bytes::from_static(b"partial")),
            Err(crate::Error::connection("reset")),
        ];
        let body: BodyStream = Box::pin(futures_util::stream::iter(chunks));

        let err = read_body(body).await.expect_err("should fail");
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn buffered_yields_single_chunk() {
        let raw = RawResponse::buffered(head(200, Some("5")), Bytes::from_static(b"hello"));
        let (response, body) = raw.into_parts();
        assert_eq!(response.status(), StatusCode::OK);

        let collected = read_body(body).await.expect("read");
        assert_eq!(collected.as_ref(), b"hello");
    }
}

//! Concrete outgoing HTTP request.
//!
//! A [`Request`] is materialized fresh from a builder for every send and is
//! never reused: the URL is fully resolved, the query string merged, and the
//! body (if any) already serialized.

use bytes::Bytes;
use http::HeaderMap;

use crate::{CancelToken, Method};

/// An HTTP request with a resolved URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: url::Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    cancel: Option<CancelToken>,
}

impl Request {
    /// Creates a new request with no headers and no body.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            cancel: None,
        }
    }

    /// Assemble a request from its parts.
    #[must_use]
    pub const fn from_parts(
        method: Method,
        url: url::Url,
        headers: HeaderMap,
        body: Option<Bytes>,
        cancel: Option<CancelToken>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
            cancel,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub const fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub const fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// First header value by name, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Cancellation token attached to this request.
    #[must_use]
    pub const fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    /// Consume into (method, url, headers, body, cancel token).
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        Method,
        url::Url,
        HeaderMap,
        Option<Bytes>,
        Option<CancelToken>,
    ) {
        (self.method, self.url, self.headers, self.body, self.cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_basic() {
        let url = url::Url::parse("https://api.example.com/users").expect("valid URL");
        let request = Request::new(Method::Get, url);

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url().as_str(), "https://api.example.com/users");
        assert!(request.body().is_none());
        assert!(request.cancel_token().is_none());
    }

    #[test]
    fn request_header_lookup_is_case_insensitive() {
        let url = url::Url::parse("https://api.example.com").expect("valid URL");
        let mut request = Request::new(Method::Get, url);
        request.headers_mut().insert(
            http::header::ACCEPT,
            http::HeaderValue::from_static("application/json"),
        );

        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("Accept"), Some("application/json"));
    }

    #[test]
    fn request_into_parts_round_trips() {
        let url = url::Url::parse("https://api.example.com/items").expect("valid URL");
        let body = Bytes::from_static(br#"{"n":5}"#);
        let request = Request::from_parts(
            Method::Post,
            url.clone(),
            HeaderMap::new(),
            Some(body.clone()),
            None,
        );

        let (method, parts_url, _, parts_body, _) = request.into_parts();
        assert_eq!(method, Method::Post);
        assert_eq!(parts_url, url);
        assert_eq!(parts_body, Some(body));
    }
}

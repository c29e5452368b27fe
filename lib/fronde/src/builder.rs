//! The `Fronde` request builder and sender.
//!
//! A [`Fronde`] accumulates method, URL, headers, query sources, and a body
//! provider, then materializes a concrete request with [`Fronde::request`]
//! or sends it with [`Fronde::send`] / [`Fronde::receive`]. Cloning is the
//! branching mechanism: a clone gets independent copies of the header map
//! and query-source list while sharing the transport, body provider, and
//! tracer, so a base configuration can be extended per endpoint without
//! mutation leaking back.
//!
//! # Example
//!
//! ```ignore
//! let api = Fronde::new().base("https://api.example.com/");
//!
//! let (_, user) = api
//!     .clone()
//!     .get("users/42")
//!     .receive_success::<User>()
//!     .await?;
//! ```

use std::sync::Arc;

use base64::Engine;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use fronde_core::{
    BodyProvider, BodyStream, CancelToken, Error, FormBody, JsonBody, JsonDecoder, Method,
    QuerySource, RawBody, RawResponse, Request, Response, ResponseDecoder, Result, TracedBody,
    Tracer, Transport, body_excerpt, merge_query, read_body,
};

use crate::client::HyperTransport;

/// HTTP request builder and sender.
///
/// Not meant for concurrent mutation: clone first, then branch. Each
/// `request()`/send call builds a fresh concrete request, so sends may run
/// concurrently across independently-cloned builders.
#[derive(Clone)]
pub struct Fronde<D = JsonDecoder> {
    transport: Arc<dyn Transport>,
    method: Method,
    url: String,
    headers: HeaderMap,
    // first invalid header mutation, surfaced by request()
    header_error: Option<String>,
    query_sources: Vec<QuerySource>,
    body: Option<Arc<dyn BodyProvider>>,
    decoder: D,
    tracer: Option<Arc<dyn Tracer>>,
    cancel: Option<CancelToken>,
}

impl Fronde {
    /// Create a builder with the default transport and JSON decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(HyperTransport::new())
    }

    /// Create a builder sending through the given transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            method: Method::Get,
            url: String::new(),
            headers: HeaderMap::new(),
            header_error: None,
            query_sources: Vec::new(),
            body: None,
            decoder: JsonDecoder,
            tracer: None,
            cancel: None,
        }
    }
}

impl Default for Fronde {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ResponseDecoder> Fronde<D> {
    // ========================================================================
    // Transport
    // ========================================================================

    /// Replace the transport used to send requests.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    // ========================================================================
    // Method and URL
    // ========================================================================

    /// Set the method to HEAD and extend the URL with `path`.
    #[must_use]
    pub fn head(self, path: &str) -> Self {
        self.method(Method::Head).path(path)
    }

    /// Set the method to GET and extend the URL with `path`.
    #[must_use]
    pub fn get(self, path: &str) -> Self {
        self.method(Method::Get).path(path)
    }

    /// Set the method to POST and extend the URL with `path`.
    #[must_use]
    pub fn post(self, path: &str) -> Self {
        self.method(Method::Post).path(path)
    }

    /// Set the method to PUT and extend the URL with `path`.
    #[must_use]
    pub fn put(self, path: &str) -> Self {
        self.method(Method::Put).path(path)
    }

    /// Set the method to PATCH and extend the URL with `path`.
    #[must_use]
    pub fn patch(self, path: &str) -> Self {
        self.method(Method::Patch).path(path)
    }

    /// Set the method to DELETE and extend the URL with `path`.
    #[must_use]
    pub fn delete(self, path: &str) -> Self {
        self.method(Method::Delete).path(path)
    }

    /// Set the method to OPTIONS and extend the URL with `path`.
    #[must_use]
    pub fn options(self, path: &str) -> Self {
        self.method(Method::Options).path(path)
    }

    /// Set the method to TRACE and extend the URL with `path`.
    #[must_use]
    pub fn trace(self, path: &str) -> Self {
        self.method(Method::Trace).path(path)
    }

    /// Set the method to CONNECT and extend the URL with `path`.
    #[must_use]
    pub fn connect(self, path: &str) -> Self {
        self.method(Method::Connect).path(path)
    }

    /// Set the HTTP method without touching the URL.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the base URL, replacing any prior value outright.
    ///
    /// Give it a trailing slash if you intend to extend it with [`path`].
    ///
    /// [`path`]: Fronde::path
    #[must_use]
    pub fn base(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Extend the URL by resolving `path` as a URI reference against it
    /// (RFC 3986): absolute paths replace the path component, relative paths
    /// append, `..`/`.` segments normalize.
    ///
    /// If either the current URL or `path` fails to parse, the URL is left
    /// unmodified; the malformed URL only surfaces later, from
    /// [`Fronde::request`].
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        if let Ok(base) = Url::parse(&self.url) {
            if let Ok(resolved) = base.join(path) {
                self.url = resolved.into();
            }
        }
        self
    }

    /// The current raw URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    // ========================================================================
    // Headers
    // ========================================================================

    /// Append a header value, keeping any existing values for the key.
    ///
    /// Key comparison is case-insensitive. An invalid name or value is
    /// latched and reported by [`Fronde::request`].
    #[must_use]
    pub fn add(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match parse_header(name.as_ref(), value.as_ref()) {
            Ok((name, value)) => {
                self.headers.append(name, value);
            }
            Err(message) => self.latch_header_error(message),
        }
        self
    }

    /// Set a header value, replacing all existing values for the key.
    ///
    /// Key comparison is case-insensitive. An invalid name or value is
    /// latched and reported by [`Fronde::request`].
    #[must_use]
    pub fn set(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match parse_header(name.as_ref(), value.as_ref()) {
            Ok((name, value)) => {
                self.headers.insert(name, value);
            }
            Err(message) => self.latch_header_error(message),
        }
        self
    }

    /// Append every value of the given map, keeping existing values.
    #[must_use]
    pub fn add_headers(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            self.headers.append(name.clone(), value.clone());
        }
        self
    }

    /// Set every key of the given map, replacing existing values but
    /// preserving the input's per-key value order.
    #[must_use]
    pub fn set_headers(mut self, headers: &HeaderMap) -> Self {
        for name in headers.keys() {
            let mut values = headers.get_all(name).iter();
            if let Some(first) = values.next() {
                self.headers.insert(name.clone(), first.clone());
            }
            for value in values {
                self.headers.append(name.clone(), value.clone());
            }
        }
        self
    }

    /// Set the `Authorization` header to HTTP Basic Authentication with the
    /// given credentials, overwriting any existing value.
    ///
    /// Credentials are base64-encoded, not encrypted.
    #[must_use]
    pub fn set_basic_auth(self, username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        let credentials = format!("{}:{}", username.as_ref(), password.as_ref());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.set(AUTHORIZATION.as_str(), format!("Basic {encoded}"))
    }

    /// The accumulated headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn latch_header_error(&mut self, message: String) {
        self.header_error.get_or_insert(message);
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// Append a structured query source, encoded to parameters when the
    /// request is built.
    #[must_use]
    pub fn query_struct<T>(mut self, query: T) -> Self
    where
        T: serde::Serialize + Send + Sync + 'static,
    {
        self.query_sources.push(QuerySource::structured(query));
        self
    }

    /// Append raw key/value query pairs, bypassing structured encoding.
    #[must_use]
    pub fn query_values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query_sources.push(QuerySource::pairs(values));
        self
    }

    // ========================================================================
    // Body
    // ========================================================================

    /// Set the request body to the given bytes, verbatim.
    ///
    /// No content type is declared; any previously set `Content-Type`
    /// header stays in place.
    #[must_use]
    pub fn body(self, body: impl Into<Bytes>) -> Self {
        self.body_provider(RawBody::new(body))
    }

    /// Set the active body provider, discarding any previous one.
    ///
    /// If the provider declares a content type, the `Content-Type` header
    /// is set (overwriting) immediately.
    #[must_use]
    pub fn body_provider(mut self, provider: impl BodyProvider + 'static) -> Self {
        if let Some(content_type) = provider.content_type() {
            self = self.set(CONTENT_TYPE.as_str(), content_type.as_str());
        }
        self.body = Some(Arc::new(provider));
        self
    }

    /// Set a JSON body; the payload is serialized when the request is built.
    #[must_use]
    pub fn body_json<T>(self, payload: T) -> Self
    where
        T: serde::Serialize + Send + Sync + 'static,
    {
        self.body_provider(JsonBody::new(payload))
    }

    /// Set a form URL-encoded body; accepts a structured value or raw pairs
    /// (`Vec<(String, String)>` encodes as repeated fields).
    #[must_use]
    pub fn body_form<T>(self, payload: T) -> Self
    where
        T: serde::Serialize + Send + Sync + 'static,
    {
        self.body_provider(FormBody::new(payload))
    }

    // ========================================================================
    // Decoding, tracing, cancellation
    // ========================================================================

    /// Replace the response decoder.
    #[must_use]
    pub fn decoder<D2: ResponseDecoder>(self, decoder: D2) -> Fronde<D2> {
        Fronde {
            transport: self.transport,
            method: self.method,
            url: self.url,
            headers: self.headers,
            header_error: self.header_error,
            query_sources: self.query_sources,
            body: self.body,
            decoder,
            tracer: self.tracer,
            cancel: self.cancel,
        }
    }

    /// Install a tracer whose hooks fire around response-body consumption.
    #[must_use]
    pub fn tracer(mut self, tracer: impl Tracer + 'static) -> Self {
        self.tracer = Some(Arc::new(tracer));
        self
    }

    /// Attach a cancellation token, threaded through to the transport.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Materialize a concrete [`Request`] from the accumulated state.
    ///
    /// Parses the URL, merges the query sources into one canonical query
    /// string (keys sorted, repeated keys preserved), serializes the body,
    /// and copies the headers in. The transport appends these headers on
    /// top of whatever defaults it sets itself.
    ///
    /// # Errors
    ///
    /// Returns the first error from URL parsing, query aggregation, body
    /// encoding, or a latched invalid header mutation.
    pub fn request(&self) -> Result<Request> {
        if let Some(message) = &self.header_error {
            return Err(Error::invalid_request(message.clone()));
        }
        let mut url = Url::parse(&self.url)?;
        let merged = merge_query(url.query(), &self.query_sources)?;
        url.set_query(merged.as_deref());

        let body = match &self.body {
            Some(provider) => Some(provider.body()?),
            None => None,
        };

        Ok(Request::from_parts(
            self.method,
            url,
            self.headers.clone(),
            body,
            self.cancel.clone(),
        ))
    }

    // ========================================================================
    // Sending
    // ========================================================================

    /// Send the request and check the status, without decoding.
    ///
    /// Returns the raw response (head plus body stream, trace-wrapped when a
    /// tracer is installed) for inspection. A non-2xx status is an error; in
    /// that case the body is drained and closed before returning.
    pub async fn send(&self) -> Result<RawResponse> {
        let request = self.request()?;
        let raw = self.dispatch(request).await?;
        let status = raw.head().status();
        if !status.is_success() {
            let (_, body) = raw.into_parts();
            // drain so the connection can be reused; the status error wins
            let _ = self.consume(body).await;
            return Err(Error::http(status.as_u16(), "request was not successful"));
        }
        match &self.tracer {
            Some(tracer) => {
                let (head, body) = raw.into_parts();
                let traced = TracedBody::new(body, Arc::clone(tracer))?;
                Ok(RawResponse::new(head, Box::pin(traced)))
            }
            None => Ok(raw),
        }
    }

    /// Send the request and decode a 2xx response body into `S`.
    ///
    /// Returns `None` instead of a value on 204 or an empty body. Without a
    /// failure destination, a non-2xx status is an error carrying the status
    /// code and a bounded excerpt of the body.
    pub async fn receive_success<S>(&self) -> Result<(Response, Option<S>)>
    where
        S: serde::de::DeserializeOwned,
    {
        let request = self.request()?;
        let raw = self.dispatch(request).await?;
        let (head, body) = raw.into_parts();
        let collected = self.consume(body).await?;
        let status = head.status();

        if status == StatusCode::NO_CONTENT {
            return Ok((head, None));
        }
        if head.content_length() == Some(0) {
            if !status.is_success() {
                return Err(Error::http(
                    status.as_u16(),
                    "request was not successful and had no body",
                ));
            }
            return Ok((head, None));
        }

        if status.is_success() {
            let value = self.decoder.decode::<S>(status, &collected)?;
            return Ok((head, Some(value)));
        }
        Err(Error::http_with_body(
            status.as_u16(),
            format!(
                "request was not successful, got body: {}",
                body_excerpt(&collected)
            ),
            collected,
        ))
    }

    /// Send the request and decode the body into `S` on 2xx or `F`
    /// otherwise.
    ///
    /// On 204 or an empty body nothing is decoded and [`Reply::None`] is
    /// returned. The body is always drained and closed before returning,
    /// including on decode failure.
    pub async fn receive<S, F>(&self) -> Result<(Response, Reply<S, F>)>
    where
        S: serde::de::DeserializeOwned,
        F: serde::de::DeserializeOwned,
    {
        let request = self.request()?;
        let raw = self.dispatch(request).await?;
        let (head, body) = raw.into_parts();
        let collected = self.consume(body).await?;
        let status = head.status();

        if status == StatusCode::NO_CONTENT || head.content_length() == Some(0) {
            return Ok((head, Reply::None));
        }

        if status.is_success() {
            let value = self.decoder.decode::<S>(status, &collected)?;
            Ok((head, Reply::Success(value)))
        } else {
            let value = self.decoder.decode::<F>(status, &collected)?;
            Ok((head, Reply::Failure(value)))
        }
    }

    async fn dispatch(&self, request: Request) -> Result<RawResponse> {
        let method = request.method();
        let url = request.url().clone();
        let cancel = request.cancel_token().cloned();
        debug!(%method, %url, "sending request");

        match self.transport.send(request).await {
            Ok(raw) => {
                let status = raw.head().status().as_u16();
                if raw.head().is_success() {
                    info!(status, "request completed");
                } else {
                    warn!(status, "request completed with non-success status");
                }
                Ok(raw)
            }
            Err(err) => {
                let err = translate_cancellation(err, cancel.as_ref());
                warn!(error = %err, "request failed");
                Err(err)
            }
        }
    }

    // Fully read and close the body, wrapping it in the tracer when one is
    // installed. Runs on every exit path of the receive methods so the
    // underlying connection stays reusable and the trace end-hook fires.
    async fn consume(&self, body: BodyStream) -> Result<Bytes> {
        match &self.tracer {
            Some(tracer) => {
                let mut traced = TracedBody::new(body, Arc::clone(tracer))?;
                let read = read_body(&mut traced).await;
                let closed = traced.close();
                let bytes = read?;
                closed?;
                Ok(bytes)
            }
            None => read_body(body).await,
        }
    }
}

// A transport reports a bare cancellation; if the token recorded a cause,
// that cause is the better diagnostic.
fn translate_cancellation(err: Error, cancel: Option<&CancelToken>) -> Error {
    match (err, cancel) {
        (Error::Cancelled { cause: None }, Some(token)) => Error::Cancelled {
            cause: token.cause(),
        },
        (err, _) => err,
    }
}

fn parse_header(name: &str, value: &str) -> std::result::Result<(HeaderName, HeaderValue), String> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| format!("invalid header name: {name}"))?;
    let value =
        HeaderValue::from_str(value).map_err(|_| format!("invalid header value for {name}"))?;
    Ok((name, value))
}

impl<D> std::fmt::Debug for Fronde<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fronde")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("query_sources", &self.query_sources)
            .field("has_body", &self.body.is_some())
            .finish_non_exhaustive()
    }
}

/// Decoded outcome of a [`Fronde::receive`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<S, F> {
    /// 2xx body decoded into the success destination.
    Success(S),
    /// Non-2xx body decoded into the failure destination.
    Failure(F),
    /// Nothing was decoded (204 or empty body).
    None,
}

impl<S, F> Reply<S, F> {
    /// Returns `true` for a decoded success value.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for a decoded failure value.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The decoded success value, if any.
    #[must_use]
    pub fn success(self) -> Option<S> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The decoded failure value, if any.
    #[must_use]
    pub fn failure(self) -> Option<F> {
        match self {
            Self::Failure(value) => Some(value),
            _ => None,
        }
    }
}

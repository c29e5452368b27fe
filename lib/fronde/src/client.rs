//! Default HTTP transport implementation using hyper-util.

use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::{BodyStream as HttpBodyStream, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::util::BoxCloneService;
use tower_service::Service;

use fronde_core::{
    Error, RawResponse, Request, Response, Result, Transport, TransportFuture,
};

use crate::config::ClientConfig;

/// Default transport: hyper-util client with connection pooling and rustls
/// TLS.
///
/// Applies the configured request timeout and races the request's
/// cancellation token against the in-flight send.
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl HyperTransport {
    /// Create a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a transport with custom configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector());

        Self { inner, config }
    }

    /// The transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a hyper request from a fronde request.
    ///
    /// Headers are appended on top of whatever defaults the lower layers
    /// set, never replacing them.
    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body, _cancel) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name, value);
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    async fn execute(&self, request: Request) -> Result<RawResponse> {
        let cancel = request.cancel_token().cloned();
        let hyper_request = Self::build_hyper_request(request)?;
        let send = tokio::time::timeout(self.config.timeout, self.inner.request(hyper_request));

        let outcome = match cancel {
            Some(token) => {
                tokio::select! {
                    () = token.cancelled() => return Err(Error::cancelled()),
                    outcome = send => outcome,
                }
            }
            None => send.await,
        };

        let response = outcome
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let (parts, incoming) = response.into_parts();
        let head = Response::new(parts.status, parts.version, parts.headers);
        let body = HttpBodyStream::new(incoming)
            .map_ok(|frame| frame.into_data().unwrap_or_default())
            .map_err(|e| Error::connection(e.to_string()));

        Ok(RawResponse::new(head, Box::pin(body)))
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: Request) -> TransportFuture {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}

impl Service<Request> for HyperTransport {
    type Response = RawResponse;
    type Error = Error;
    type Future = TransportFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        Transport::send(self, request)
    }
}

// HTTPS connector with rustls and the Mozilla root certificates, speaking
// HTTP/1.1 and HTTP/2.
fn https_connector() -> HttpsConnector<HttpConnector> {
    let root_store: rustls::RootCertStore =
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build()
}

// ============================================================================
// Tower Service Adapter
// ============================================================================

/// Type-erased tower service over fronde requests.
pub type BoxedService = BoxCloneService<Request, RawResponse, Error>;

/// Adapter turning any compatible tower service into a [`Transport`].
///
/// Lets a middleware-wrapped service stack (logging, auth, ...) be injected
/// as a builder's transport. The mutex makes the `&mut self` service
/// callable from the shared-reference transport contract; it is locked only
/// long enough to clone the service.
#[derive(Clone)]
pub struct ServiceTransport {
    inner: Arc<Mutex<BoxedService>>,
}

impl ServiceTransport {
    /// Wrap a tower service as a transport.
    pub fn new<S>(service: S) -> Self
    where
        S: Service<Request, Response = RawResponse, Error = Error> + Clone + Send + 'static,
        S::Future: Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(BoxCloneService::new(service))),
        }
    }
}

impl Transport for ServiceTransport {
    fn send(&self, request: Request) -> TransportFuture {
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

impl std::fmt::Debug for ServiceTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceTransport").finish_non_exhaustive()
    }
}

//! Transport abstraction.

use std::future::Future;
use std::pin::Pin;

use crate::{RawResponse, Request, Result};

/// Future type returned by [`Transport::send`].
pub type TransportFuture = Pin<Box<dyn Future<Output = Result<RawResponse>> + Send>>;

/// Capability for sending a request and receiving a response.
///
/// The builder holds its transport as `Arc<dyn Transport>`, so the trait is
/// dyn-compatible and `send` returns a boxed future. Any conforming
/// implementation is accepted: the default hyper-based client, a
/// middleware-wrapped tower service, or a test stub.
///
/// Implementations must honor the request's cancellation token (abandon the
/// in-flight send promptly once cancelled) and apply their own timeout
/// policy; the core imposes none.
pub trait Transport: Send + Sync {
    /// Send the request, returning the response head and body stream.
    fn send(&self, request: Request) -> TransportFuture;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: Request) -> TransportFuture {
        (**self).send(request)
    }
}

//! Response body tracing.
//!
//! A [`TracedBody`] wraps a body stream so a [`Tracer`]'s end hook fires
//! exactly once, on whichever comes first: the stream reporting end of
//! data, an explicit [`TracedBody::close`], or the wrapper being dropped.
//! The begin hook fires when the body is wrapped.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;

use crate::{BodyStream, Error, Result};

/// Lifecycle hook invoked around response-body consumption.
pub trait Tracer: Send + Sync {
    /// Called when body consumption starts (at wrap time).
    ///
    /// # Errors
    ///
    /// A failure aborts the wrap and surfaces to the caller.
    fn begin_trace(&self) -> Result<()>;

    /// Called exactly once when the body is fully consumed or closed.
    ///
    /// # Errors
    ///
    /// A failure surfaces as a wrapped error from the triggering read or
    /// close.
    fn end_trace(&self) -> Result<()>;
}

impl<T: Tracer + ?Sized> Tracer for Arc<T> {
    fn begin_trace(&self) -> Result<()> {
        (**self).begin_trace()
    }

    fn end_trace(&self) -> Result<()> {
        (**self).end_trace()
    }
}

// One-shot guard over the trace lifecycle. `end_trace` only fires on the
// Started -> Ended transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraceState {
    Started,
    Ended,
}

/// Body stream wrapper firing trace hooks on consumption boundaries.
///
/// The body is single-consumer: it is read to the end or closed, never
/// both concurrently, so the guard needs no cross-thread synchronization.
pub struct TracedBody {
    inner: BodyStream,
    tracer: Arc<dyn Tracer>,
    state: TraceState,
    inner_done: bool,
}

impl TracedBody {
    /// Wrap a body stream, firing the tracer's begin hook.
    ///
    /// # Errors
    ///
    /// Returns an error if the begin hook fails; the body is dropped
    /// unwrapped in that case.
    pub fn new(inner: BodyStream, tracer: Arc<dyn Tracer>) -> Result<Self> {
        tracer
            .begin_trace()
            .map_err(|err| Error::trace(format!("failed to begin trace: {err}")))?;
        Ok(Self {
            inner,
            tracer,
            state: TraceState::Started,
            inner_done: false,
        })
    }

    /// Close the body, firing the end hook if it has not fired yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the end hook fails.
    pub fn close(&mut self) -> Result<()> {
        self.end_trace()
            .map_err(|err| Error::trace(format!("failed to end trace on close: {err}")))
    }

    fn end_trace(&mut self) -> Result<()> {
        if self.state != TraceState::Started {
            return Ok(());
        }
        self.state = TraceState::Ended;
        self.tracer.end_trace()
    }
}

impl Stream for TracedBody {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.inner_done {
            return Poll::Ready(None);
        }
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(None) => {
                this.inner_done = true;
                match this.end_trace() {
                    Ok(()) => Poll::Ready(None),
                    Err(err) => Poll::Ready(Some(Err(Error::trace(format!(
                        "reached end of body, then failed to end trace: {err}"
                    ))))),
                }
            }
            other => other,
        }
    }
}

impl Drop for TracedBody {
    fn drop(&mut self) {
        // last-resort guarantee for abandoned bodies; the one-shot guard
        // makes this a no-op after a normal end-of-data or close
        let _ = self.end_trace();
    }
}

impl std::fmt::Debug for TracedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracedBody")
            .field("state", &self.state)
            .field("inner_done", &self.inner_done)
            .finish_non_exhaustive()
    }
}

//! Request cancellation.
//!
//! A [`CancelToken`] is a cheap clonable handle attached to a request.
//! Canceling it makes the transport abandon the in-flight send; an optional
//! recorded cause replaces the generic cancellation error so callers can
//! tell a deliberate cancellation from a bare signal.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Waker};

/// Clonable cancellation handle with an optional recorded cause.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    cancelled: AtomicBool,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    cause: Option<String>,
    wakers: Vec<Waker>,
}

impl CancelToken {
    /// Create a new, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel without recording a cause.
    pub fn cancel(&self) {
        self.cancel_inner(None);
    }

    /// Cancel and record a cause, kept for diagnostics.
    ///
    /// The first cancellation wins; a later cause is ignored.
    pub fn cancel_with_cause(&self, cause: impl Into<String>) {
        self.cancel_inner(Some(cause.into()));
    }

    fn cancel_inner(&self, cause: Option<String>) {
        let mut state = self.lock_state();
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        state.cause = cause;
        for waker in state.wakers.drain(..) {
            waker.wake();
        }
    }

    /// Returns `true` once the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// The recorded cancellation cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<String> {
        self.lock_state().cause.clone()
    }

    /// Future resolving when the token is cancelled.
    #[must_use]
    pub const fn cancelled(&self) -> Cancelled<'_> {
        Cancelled { token: self }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Future returned by [`CancelToken::cancelled`].
#[derive(Debug)]
pub struct Cancelled<'a> {
    token: &'a CancelToken,
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.token.is_cancelled() {
            return Poll::Ready(());
        }
        let mut state = self.token.lock_state();
        // re-check under the lock so a concurrent cancel cannot slip between
        // the fast check and the waker registration
        if self.token.inner.cancelled.load(Ordering::SeqCst) {
            return Poll::Ready(());
        }
        state.wakers.push(cx.waker().clone());
        Poll::Pending
    }
}

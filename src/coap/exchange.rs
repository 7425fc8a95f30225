//! Message exchange
//!
//! Ties a sent request to the observers interested in what arrives for it
//! afterwards (notifications, cancellation).

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{CoapRequest, CoapResponse, Token};

/// Callback attached to an exchange
pub trait MessageObserver: Send + Sync {
    /// A response (typically a notification) arrived on the exchange
    fn on_response(&self, response: &CoapResponse);

    /// The exchange was cancelled; called at most once
    fn on_cancel(&self) {}
}

/// A live request/response exchange
pub struct Exchange {
    request: CoapRequest,
    observers: Mutex<Vec<Arc<dyn MessageObserver>>>,
    cancelled: AtomicBool,
}

impl Exchange {
    pub fn new(request: CoapRequest) -> Arc<Self> {
        Arc::new(Self {
            request,
            observers: Mutex::new(Vec::new()),
            cancelled: AtomicBool::new(false),
        })
    }

    pub fn request(&self) -> &CoapRequest {
        &self.request
    }

    pub fn token(&self) -> Token {
        self.request.token
    }

    /// Attach an observer
    ///
    /// Observers added after cancellation are cancelled immediately.
    pub fn add_observer(&self, observer: Arc<dyn MessageObserver>) {
        if self.is_cancelled() {
            observer.on_cancel();
            return;
        }
        self.observers.lock().push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Hand a response that arrived on this exchange to every observer
    pub fn deliver(&self, response: &CoapResponse) {
        if self.is_cancelled() {
            tracing::trace!("Dropping response on cancelled exchange {}", self.token());
            return;
        }

        // Snapshot so observers may re-enter the exchange
        let observers: Vec<_> = self.observers.lock().clone();
        for observer in observers {
            observer.on_response(response);
        }
    }

    /// Cancel the exchange and notify observers (idempotent)
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }

        let observers = std::mem::take(&mut *self.observers.lock());
        for observer in observers {
            observer.on_cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("token", &self.request.token)
            .field("uri", &self.request.uri())
            .field("observers", &self.observer_count())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

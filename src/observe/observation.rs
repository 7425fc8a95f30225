//! Observation
//!
//! A live subscription created by a successful observe request.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::client::Client;
use crate::coap::{CoapResponse, Exchange, MessageObserver, Token};
use crate::node::LwM2mPath;

use super::ObservationRegistry;

/// A registered observation
///
/// Identity is (request token, endpoint, path). The registry and the exchange
/// each hold it through an `Arc`; it only points back at them weakly.
pub struct Observation {
    token: Token,
    endpoint: String,
    registration_id: String,
    path: LwM2mPath,

    /// Exchange that carried the observe request
    exchange: Weak<Exchange>,

    /// Registry notifications and cancellations are routed to
    registry: Weak<dyn ObservationRegistry>,
}

impl Observation {
    /// Bind a new observation to `exchange`
    pub fn new(
        exchange: &Arc<Exchange>,
        client: &Client,
        path: LwM2mPath,
        registry: Weak<dyn ObservationRegistry>,
    ) -> Self {
        Self {
            token: exchange.token(),
            endpoint: client.endpoint.clone(),
            registration_id: client.registration_id.clone(),
            path,
            exchange: Arc::downgrade(exchange),
            registry,
        }
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    pub fn path(&self) -> &LwM2mPath {
        &self.path
    }

    /// True while the underlying exchange is alive and not cancelled
    pub fn is_active(&self) -> bool {
        self.exchange
            .upgrade()
            .map(|exchange| !exchange.is_cancelled())
            .unwrap_or(false)
    }

    /// Cancel the underlying exchange, if it is still alive
    pub(crate) fn cancel_exchange(&self) {
        if let Some(exchange) = self.exchange.upgrade() {
            exchange.cancel();
        }
    }
}

impl MessageObserver for Observation {
    fn on_response(&self, response: &CoapResponse) {
        if let Some(registry) = self.registry.upgrade() {
            registry.notify(self.token, response);
        }
    }

    fn on_cancel(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.cancel_observation(self.token);
        }
    }
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observation")
            .field("token", &self.token)
            .field("endpoint", &self.endpoint)
            .field("path", &self.path)
            .finish()
    }
}

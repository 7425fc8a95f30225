//! Session Module
//!
//! The calling layer around the translator: sends a request through a
//! transport, translates what comes back and applies the configured
//! policy for failed observation registrations.
//!
//! ## Responsibilities
//! - Build the CoAP request and its exchange
//! - Hand the exchange to the transport and wait for its response
//! - Translate the response exactly once
//! - Tear down observations when a client goes away

use std::sync::Arc;

use crate::client::Client;
use crate::codec::{DefaultDecoder, NodeDecoder};
use crate::coap::{CoapResponse, Exchange};
use crate::config::{Config, RegistrationFailurePolicy};
use crate::error::Result;
use crate::node::LwM2mPath;
use crate::observe::{InMemoryObservationRegistry, ObservationRegistry};
use crate::request::{build_request, DownlinkRequest};
use crate::response::LwM2mResponse;
use crate::translate::{ResponseTranslator, Translation};

/// Sends an exchange's request and returns the device's response
///
/// Retransmission, timeouts and cancellation are the transport's business.
pub trait Transport: Send + Sync {
    fn send(&self, exchange: &Arc<Exchange>) -> Result<CoapResponse>;
}

/// A device-management session
pub struct Session {
    config: Config,
    translator: ResponseTranslator,
    registry: Arc<dyn ObservationRegistry>,
}

impl Session {
    /// Create a session around an existing decoder and registry
    pub fn new(
        config: Config,
        decoder: Arc<dyn NodeDecoder>,
        registry: Arc<dyn ObservationRegistry>,
    ) -> Result<Self> {
        config.validate()?;

        let translator = ResponseTranslator::new(decoder, Arc::clone(&registry))
            .with_max_payload_size(config.max_payload_size);

        Ok(Self {
            config,
            translator,
            registry,
        })
    }

    /// Create a session with the default decoder and an in-memory registry
    pub fn open(config: Config) -> Result<Self> {
        let decoder: Arc<dyn NodeDecoder> = Arc::new(DefaultDecoder::default());
        let registry = match config.max_observations {
            Some(capacity) => InMemoryObservationRegistry::with_capacity(Arc::clone(&decoder), capacity),
            None => InMemoryObservationRegistry::new(Arc::clone(&decoder)),
        };
        Self::new(config, decoder, Arc::new(registry))
    }

    /// Send `request` to `client` and translate the response
    ///
    /// Returns `Ok(None)` when the response was suppressed.
    pub fn send<T: Transport + ?Sized>(
        &self,
        transport: &T,
        client: &Client,
        request: &DownlinkRequest,
    ) -> Result<Option<LwM2mResponse>> {
        let exchange = Exchange::new(build_request(request, client));
        tracing::debug!(
            "Sending {:?} {} to [{}] (token {})",
            request.kind(),
            exchange.request().uri(),
            client.endpoint,
            exchange.token()
        );

        let response = transport.send(&exchange)?;
        self.complete(client, request, &exchange, &response)
    }

    /// Translate a response that arrived on `exchange`
    pub fn complete(
        &self,
        client: &Client,
        request: &DownlinkRequest,
        exchange: &Arc<Exchange>,
        response: &CoapResponse,
    ) -> Result<Option<LwM2mResponse>> {
        match self.translator.translate(client, request, exchange, response)? {
            Translation::Response(response) => Ok(Some(response)),
            Translation::Suppressed => Ok(None),
            Translation::Observed {
                response,
                registration: Ok(_),
            } => Ok(Some(response)),
            Translation::Observed {
                response,
                registration: Err(e),
            } => match self.config.registration_failure {
                RegistrationFailurePolicy::Fail => {
                    exchange.cancel();
                    Err(e)
                }
                RegistrationFailurePolicy::Degrade => {
                    tracing::warn!(
                        "Observe of {} on [{}] succeeded but was not registered: {}",
                        request.path(),
                        client.endpoint,
                        e
                    );
                    Ok(Some(response))
                }
            },
        }
    }

    /// Drop every observation of a client that deregistered
    pub fn deregister(&self, client: &Client) -> usize {
        let cancelled = self.registry.cancel_observations(&client.endpoint);
        tracing::debug!("Client [{}] deregistered, {} observations cancelled", client.endpoint, cancelled);
        cancelled
    }

    /// Stop observing one resource of a client
    pub fn cancel_observation(&self, client: &Client, path: &LwM2mPath) -> usize {
        self.registry.cancel_path(&client.endpoint, path)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn translator(&self) -> &ResponseTranslator {
        &self.translator
    }

    pub fn registry(&self) -> &Arc<dyn ObservationRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

//! Response Translation
//!
//! Turns the CoAP response to a downlink request into its typed LwM2M result.
//!
//! ## Status Classification
//! ```text
//! ┌──────────────────┬──────────┬──────────────────────────────────────────────┐
//! │ Request          │ Success  │ Recognized failures                          │
//! ├──────────────────┼──────────┼──────────────────────────────────────────────┤
//! │ Read             │ 2.05     │ 4.01 4.04 4.05                               │
//! │ Discover         │ 2.05     │ 4.01 4.04 4.05                               │
//! │ Write            │ 2.04     │ 4.00 4.01 4.04 4.05                          │
//! │ Write-Attributes │ 2.04     │ 4.00 4.01 4.04 4.05                          │
//! │ Execute          │ 2.04     │ 4.00 4.01 4.04 4.05                          │
//! │ Create           │ 2.01     │ 4.00 4.01 4.04 4.05                          │
//! │ Delete           │ 2.02     │ 4.01 4.04 4.05                               │
//! │ Observe          │ 2.05     │ 4.04 4.05   (2.04 is suppressed)             │
//! └──────────────────┴──────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Anything else is an `UnexpectedResponseCode` error, or an
//! `UnsupportedStatusCode` error when the code has no LwM2M meaning at all.

use std::sync::Arc;

use crate::client::Client;
use crate::codec::{self, NodeDecoder};
use crate::coap::{CoapResponse, ContentFormat, Exchange, ResponseCode};
use crate::config::Config;
use crate::error::{BridgeError, CodecError, Result};
use crate::link;
use crate::node::{LwM2mNode, LwM2mPath};
use crate::observe::{Observation, ObservationRegistry};
use crate::request::DownlinkRequest;
use crate::response::{map_status, LwM2mResponse, ResultCode};

/// Outcome of translating one response
#[derive(Debug)]
pub enum Translation {
    /// A typed response
    Response(LwM2mResponse),

    /// A successful observe; `registration` reports whether the observation
    /// could be registered, independently of the response itself
    Observed {
        response: LwM2mResponse,
        registration: Result<Arc<Observation>>,
    },

    /// No response should be produced (a notification arrived on the
    /// observe exchange)
    Suppressed,
}

impl Translation {
    /// The built response, if any
    pub fn response(&self) -> Option<&LwM2mResponse> {
        match self {
            Translation::Response(response) | Translation::Observed { response, .. } => Some(response),
            Translation::Suppressed => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Translation::Suppressed)
    }
}

/// Translates CoAP responses into LwM2M responses
///
/// Stateless apart from the shared registry; one instance serves every
/// exchange concurrently.
pub struct ResponseTranslator {
    decoder: Arc<dyn NodeDecoder>,
    registry: Arc<dyn ObservationRegistry>,
    max_payload_size: usize,
}

impl ResponseTranslator {
    pub fn new(decoder: Arc<dyn NodeDecoder>, registry: Arc<dyn ObservationRegistry>) -> Self {
        Self {
            decoder,
            registry,
            max_payload_size: Config::default().max_payload_size,
        }
    }

    /// Refuse to decode payloads larger than `size` bytes
    pub fn with_max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Translate the response received for `request`
    ///
    /// `exchange` is the exchange that carried the request; it supplies the
    /// request URI for errors and is where a new observation gets attached.
    pub fn translate(
        &self,
        client: &Client,
        request: &DownlinkRequest,
        exchange: &Arc<Exchange>,
        response: &CoapResponse,
    ) -> Result<Translation> {
        tracing::trace!(
            "Translating {} for {:?} {} from [{}]",
            response.code,
            request.kind(),
            request.path(),
            client.endpoint
        );

        let code = response.code;
        let translation = match request {
            DownlinkRequest::Read { path } => match code {
                ResponseCode::Content => Translation::Response(self.build_content_response(path, response)?),
                ResponseCode::Unauthorized | ResponseCode::NotFound | ResponseCode::MethodNotAllowed => {
                    Translation::Response(LwM2mResponse::value_failure(map_status(code.value())?))
                }
                _ => return Err(unexpected(client, exchange, code)),
            },

            DownlinkRequest::Discover { path } => match code {
                ResponseCode::Content => Translation::Response(self.build_discover_response(client, path, response)?),
                ResponseCode::NotFound | ResponseCode::Unauthorized | ResponseCode::MethodNotAllowed => {
                    Translation::Response(LwM2mResponse::discover_failure(map_status(code.value())?))
                }
                _ => return Err(unexpected(client, exchange, code)),
            },

            DownlinkRequest::Write { .. }
            | DownlinkRequest::WriteAttributes { .. }
            | DownlinkRequest::Execute { .. } => match code {
                ResponseCode::Changed
                | ResponseCode::BadRequest
                | ResponseCode::NotFound
                | ResponseCode::Unauthorized
                | ResponseCode::MethodNotAllowed => {
                    Translation::Response(LwM2mResponse::generic(map_status(code.value())?))
                }
                _ => return Err(unexpected(client, exchange, code)),
            },

            DownlinkRequest::Create { .. } => match code {
                ResponseCode::Created => {
                    Translation::Response(LwM2mResponse::created(response.options.location_path_string()))
                }
                ResponseCode::BadRequest
                | ResponseCode::Unauthorized
                | ResponseCode::NotFound
                | ResponseCode::MethodNotAllowed => {
                    Translation::Response(LwM2mResponse::create_failure(map_status(code.value())?))
                }
                _ => return Err(unexpected(client, exchange, code)),
            },

            DownlinkRequest::Delete { .. } => match code {
                ResponseCode::Deleted
                | ResponseCode::Unauthorized
                | ResponseCode::NotFound
                | ResponseCode::MethodNotAllowed => {
                    Translation::Response(LwM2mResponse::generic(map_status(code.value())?))
                }
                _ => return Err(unexpected(client, exchange, code)),
            },

            DownlinkRequest::Observe { path } => match code {
                ResponseCode::Changed => {
                    // A notification sharing the observe exchange, not an answer to it
                    tracing::debug!(
                        "Ignoring {} on observe {} of [{}]",
                        code,
                        path,
                        client.endpoint
                    );
                    Translation::Suppressed
                }
                ResponseCode::Content => {
                    let value = self.build_content_response(path, response)?;
                    if response.options.has_observe() {
                        let registration = self.register_observation(exchange, client, path);
                        Translation::Observed {
                            response: value,
                            registration,
                        }
                    } else {
                        Translation::Response(value)
                    }
                }
                ResponseCode::NotFound | ResponseCode::MethodNotAllowed => {
                    Translation::Response(LwM2mResponse::value_failure(map_status(code.value())?))
                }
                _ => return Err(unexpected(client, exchange, code)),
            },
        };

        Ok(translation)
    }

    /// Register an observation for a successful observe
    ///
    /// The observation is added to the registry, then attached to `exchange`
    /// so later notifications on it reach the registry.
    pub fn register_observation(
        &self,
        exchange: &Arc<Exchange>,
        client: &Client,
        path: &LwM2mPath,
    ) -> Result<Arc<Observation>> {
        let observation = Arc::new(Observation::new(
            exchange,
            client,
            *path,
            Arc::downgrade(&self.registry),
        ));

        self.registry.add_observation(Arc::clone(&observation))?;
        exchange.add_observer(observation.clone());

        Ok(observation)
    }

    /// Decode a success payload for `path`
    ///
    /// Failures surface as `InvalidContent` carrying the 2.05 the device sent.
    pub fn decode_content(&self, path: &LwM2mPath, response: &CoapResponse) -> Result<LwM2mNode> {
        if response.payload.len() > self.max_payload_size {
            return Err(invalid_content(
                path,
                CodecError::new(
                    format!(
                        "Payload of {} bytes exceeds the {} byte limit",
                        response.payload.len(),
                        self.max_payload_size
                    ),
                    *path,
                ),
            ));
        }

        let format = codec::resolve_format(response.options.content_format, path)
            .map_err(|e| invalid_content(path, e))?;

        self.decoder
            .decode(&response.payload, format, path)
            .map_err(|e| invalid_content(path, e))
    }

    fn build_content_response(&self, path: &LwM2mPath, response: &CoapResponse) -> Result<LwM2mResponse> {
        let content = self.decode_content(path, response)?;
        Ok(LwM2mResponse::content(content))
    }

    fn build_discover_response(
        &self,
        client: &Client,
        path: &LwM2mPath,
        response: &CoapResponse,
    ) -> Result<LwM2mResponse> {
        if response.options.content_format != Some(ContentFormat::LINK_FORMAT_CODE) {
            tracing::debug!(
                "Expected LwM2M client [{}] to return application/link-format [{}] content but got [{:?}]",
                client.endpoint,
                ContentFormat::LINK_FORMAT_CODE,
                response.options.content_format
            );
            return Ok(LwM2mResponse::discovered(Vec::new()));
        }

        let links = link::parse(&response.payload)
            .map_err(|e| invalid_content(path, CodecError::new(e.to_string(), *path)))?;
        Ok(LwM2mResponse::discovered(links))
    }
}

fn invalid_content(path: &LwM2mPath, source: CodecError) -> BridgeError {
    BridgeError::InvalidContent {
        code: ResultCode::Content,
        path: path.to_string(),
        reason: format!("{} ({})", source.message, source.path),
        source,
    }
}

/// Error for a status the request does not allow
fn unexpected(client: &Client, exchange: &Exchange, code: ResponseCode) -> BridgeError {
    match map_status(code.value()) {
        Ok(code) => BridgeError::UnexpectedResponseCode {
            endpoint: client.endpoint.clone(),
            request_uri: exchange.request().uri(),
            code,
        },
        Err(e) => e,
    }
}

//! Observation registry
//!
//! Tracks live observations and routes their notifications to listeners.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::codec::{self, NodeDecoder};
use crate::coap::{CoapResponse, Token};
use crate::error::{BridgeError, Result};
use crate::node::LwM2mPath;

use super::{Observation, ObservationListener};

/// Store of live observations
///
/// Implementations must accept concurrent calls from any thread completing an
/// exchange.
pub trait ObservationRegistry: Send + Sync {
    /// Register an observation
    fn add_observation(&self, observation: Arc<Observation>) -> Result<()>;

    /// Remove an observation and cancel its exchange
    fn cancel_observation(&self, token: Token) -> Option<Arc<Observation>>;

    /// Remove every observation of an endpoint, returning how many were removed
    fn cancel_observations(&self, endpoint: &str) -> usize;

    /// Remove the observations of one resource of an endpoint
    fn cancel_path(&self, endpoint: &str, path: &LwM2mPath) -> usize;

    /// Live observations of an endpoint
    fn observations(&self, endpoint: &str) -> Vec<Arc<Observation>>;

    /// Look up an observation by token
    fn get(&self, token: Token) -> Option<Arc<Observation>>;

    /// Route a notification received for `token`
    fn notify(&self, token: Token, response: &CoapResponse);

    fn add_listener(&self, listener: Arc<dyn ObservationListener>);

    fn remove_listener(&self, listener: &Arc<dyn ObservationListener>);
}

/// In-memory registry
///
/// ## Concurrency:
/// - `observations`: RwLock (lookups share, add/cancel exclusive)
/// - `listeners`: RwLock, snapshotted before callbacks run
/// - No lock is held while exchanges are cancelled or listeners run
pub struct InMemoryObservationRegistry {
    /// Live observations keyed by request token
    observations: RwLock<HashMap<Token, Arc<Observation>>>,

    listeners: RwLock<Vec<Arc<dyn ObservationListener>>>,

    /// Decoder for notification payloads
    decoder: Arc<dyn NodeDecoder>,

    /// Maximum number of live observations
    capacity: Option<usize>,

    /// Set once the registry stops accepting observations
    closed: AtomicBool,
}

impl InMemoryObservationRegistry {
    /// Create an unbounded registry
    pub fn new(decoder: Arc<dyn NodeDecoder>) -> Self {
        Self {
            observations: RwLock::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
            decoder,
            capacity: None,
            closed: AtomicBool::new(false),
        }
    }

    /// Create a registry holding at most `capacity` observations
    pub fn with_capacity(decoder: Arc<dyn NodeDecoder>, capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new(decoder)
        }
    }

    /// Number of live observations
    pub fn len(&self) -> usize {
        self.observations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.read().is_empty()
    }

    /// Cancel everything and refuse further registrations
    pub fn close(&self) {
        // Flag set under the same lock add_observation checks it under
        let drained: Vec<_> = {
            let mut observations = self.observations.write();
            self.closed.store(true, Ordering::Release);
            observations.drain().map(|(_, o)| o).collect()
        };
        for observation in &drained {
            self.teardown(observation);
        }
        tracing::info!("Observation registry closed, {} observations cancelled", drained.len());
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Cancel a removed observation's exchange and tell the listeners
    fn teardown(&self, observation: &Arc<Observation>) {
        observation.cancel_exchange();

        let listeners: Vec<_> = self.listeners.read().clone();
        for listener in listeners {
            listener.cancelled(observation);
        }
    }

    /// Remove every observation matching `predicate`
    fn remove_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Observation) -> bool,
    {
        let removed: Vec<Arc<Observation>> = {
            let mut observations = self.observations.write();
            let tokens: Vec<Token> = observations
                .iter()
                .filter(|(_, o)| predicate(o))
                .map(|(token, _)| *token)
                .collect();
            tokens
                .into_iter()
                .filter_map(|token| observations.remove(&token))
                .collect()
        };

        for observation in &removed {
            tracing::info!(
                "Observation {} of [{}] on {} cancelled",
                observation.token(),
                observation.endpoint(),
                observation.path()
            );
            self.teardown(observation);
        }
        removed.len()
    }
}

impl ObservationRegistry for InMemoryObservationRegistry {
    fn add_observation(&self, observation: Arc<Observation>) -> Result<()> {
        // One live observation per resource: the newest replaces the others
        let replaced: Vec<Arc<Observation>> = {
            let mut observations = self.observations.write();
            if self.is_closed() {
                return Err(BridgeError::Registration("registry is closed".to_string()));
            }

            let stale: Vec<Token> = observations
                .values()
                .filter(|o| {
                    o.token() != observation.token()
                        && o.endpoint() == observation.endpoint()
                        && o.path() == observation.path()
                })
                .map(|o| o.token())
                .collect();

            let remaining = observations.len() - stale.len();
            let is_new = !observations.contains_key(&observation.token());
            if let Some(capacity) = self.capacity {
                if is_new && remaining >= capacity {
                    return Err(BridgeError::Registration(format!(
                        "observation limit reached ({})",
                        capacity
                    )));
                }
            }

            let replaced = stale
                .into_iter()
                .filter_map(|token| observations.remove(&token))
                .collect();
            observations.insert(observation.token(), Arc::clone(&observation));
            replaced
        };

        for old in &replaced {
            tracing::debug!(
                "Observation {} of [{}] on {} replaced by {}",
                old.token(),
                old.endpoint(),
                old.path(),
                observation.token()
            );
            self.teardown(old);
        }

        tracing::info!(
            "Observation {} registered for [{}] on {}",
            observation.token(),
            observation.endpoint(),
            observation.path()
        );
        Ok(())
    }

    fn cancel_observation(&self, token: Token) -> Option<Arc<Observation>> {
        let removed = self.observations.write().remove(&token)?;
        tracing::info!(
            "Observation {} of [{}] on {} cancelled",
            token,
            removed.endpoint(),
            removed.path()
        );
        self.teardown(&removed);
        Some(removed)
    }

    fn cancel_observations(&self, endpoint: &str) -> usize {
        self.remove_where(|o| o.endpoint() == endpoint)
    }

    fn cancel_path(&self, endpoint: &str, path: &LwM2mPath) -> usize {
        self.remove_where(|o| o.endpoint() == endpoint && o.path() == path)
    }

    fn observations(&self, endpoint: &str) -> Vec<Arc<Observation>> {
        self.observations
            .read()
            .values()
            .filter(|o| o.endpoint() == endpoint)
            .cloned()
            .collect()
    }

    fn get(&self, token: Token) -> Option<Arc<Observation>> {
        self.observations.read().get(&token).cloned()
    }

    fn notify(&self, token: Token, response: &CoapResponse) {
        let Some(observation) = self.get(token) else {
            tracing::trace!("Notification for unknown observation {}", token);
            return;
        };

        if !response.code.is_success() {
            // The device ended the observation
            tracing::debug!(
                "Observation {} of [{}] ended by device with {}",
                token,
                observation.endpoint(),
                response.code
            );
            self.cancel_observation(token);
            return;
        }

        let path = observation.path();
        let node = codec::resolve_format(response.options.content_format, path)
            .and_then(|format| self.decoder.decode(&response.payload, format, path));

        let node = match node {
            Ok(node) => node,
            Err(e) => {
                tracing::warn!(
                    "Dropping notification {} from [{}] on {}: {}",
                    token,
                    observation.endpoint(),
                    path,
                    e
                );
                return;
            }
        };

        let listeners: Vec<_> = self.listeners.read().clone();
        for listener in listeners {
            listener.new_value(&observation, &node);
        }
    }

    fn add_listener(&self, listener: Arc<dyn ObservationListener>) {
        self.listeners.write().push(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn ObservationListener>) {
        self.listeners.write().retain(|l| !Arc::ptr_eq(l, listener));
    }
}

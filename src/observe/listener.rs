//! Observation listeners

use crossbeam::channel::{self, Receiver, Sender};

use crate::coap::Token;
use crate::node::{LwM2mNode, LwM2mPath};

use super::Observation;

/// Receives events for every observation in a registry
pub trait ObservationListener: Send + Sync {
    /// A notification was decoded
    fn new_value(&self, observation: &Observation, value: &LwM2mNode);

    /// The observation was removed from the registry
    fn cancelled(&self, _observation: &Observation) {}
}

/// Event forwarded by [`ChannelListener`]
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationEvent {
    Value {
        token: Token,
        endpoint: String,
        path: LwM2mPath,
        value: LwM2mNode,
    },
    Cancelled {
        token: Token,
        endpoint: String,
        path: LwM2mPath,
    },
}

/// Listener that forwards events into a channel
pub struct ChannelListener {
    sender: Sender<ObservationEvent>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel
    pub fn new() -> (Self, Receiver<ObservationEvent>) {
        let (sender, receiver) = channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl ObservationListener for ChannelListener {
    fn new_value(&self, observation: &Observation, value: &LwM2mNode) {
        let event = ObservationEvent::Value {
            token: observation.token(),
            endpoint: observation.endpoint().to_string(),
            path: *observation.path(),
            value: value.clone(),
        };
        if self.sender.send(event).is_err() {
            tracing::trace!("Observation receiver dropped, discarding value");
        }
    }

    fn cancelled(&self, observation: &Observation) {
        let event = ObservationEvent::Cancelled {
            token: observation.token(),
            endpoint: observation.endpoint().to_string(),
            path: *observation.path(),
        };
        if self.sender.send(event).is_err() {
            tracing::trace!("Observation receiver dropped, discarding cancellation");
        }
    }
}

//! Registered client
//!
//! Identity of the device a request is sent to.

use std::net::SocketAddr;

/// A device registered with the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Endpoint name the device registered with
    pub endpoint: String,

    /// Registration id handed out by the server
    pub registration_id: String,

    /// Current peer address
    pub address: Option<SocketAddr>,
}

impl Client {
    pub fn new(endpoint: impl Into<String>, registration_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            registration_id: registration_id.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: SocketAddr) -> Self {
        self.address = Some(address);
        self
    }
}

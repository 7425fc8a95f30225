//! CoAP request and response messages
//!
//! Only the fields the LwM2M layer reads or writes are modelled; framing,
//! message ids and retransmission live in the transport.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use super::{ResponseCode, ResponseOptions};

/// Request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Method {
    Get = 0x01,
    Post = 0x02,
    Put = 0x03,
    Delete = 0x04,
}

/// Request token, the identity a response and its notifications are matched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

/// Next token to hand out (process-wide, lock-free)
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

impl Token {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Allocate a fresh token
    pub fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    /// 8-byte big-endian wire form
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// An outgoing CoAP request
#[derive(Debug, Clone)]
pub struct CoapRequest {
    pub method: Method,
    pub token: Token,

    /// Peer the request is sent to
    pub destination: Option<SocketAddr>,

    /// Uri-Path option, one entry per segment
    pub uri_path: Vec<String>,

    /// Uri-Query option, one `key=value` entry per parameter
    pub uri_query: Vec<String>,

    /// Accept option
    pub accept: Option<u16>,

    /// Observe option (0 = register)
    pub observe: Option<u32>,

    /// Content-Format option of the payload
    pub content_format: Option<u16>,

    pub payload: Bytes,
}

impl CoapRequest {
    /// Create a request with a fresh token and no options
    pub fn new(method: Method) -> Self {
        Self {
            method,
            token: Token::next(),
            destination: None,
            uri_path: Vec::new(),
            uri_query: Vec::new(),
            accept: None,
            observe: None,
            content_format: None,
            payload: Bytes::new(),
        }
    }

    /// Full request URI (`coap://host:port/3/0/1?pmin=10`)
    pub fn uri(&self) -> String {
        let mut uri = match self.destination {
            Some(addr) => format!("coap://{}", addr),
            None => String::new(),
        };
        for segment in &self.uri_path {
            uri.push('/');
            uri.push_str(segment);
        }
        if self.uri_path.is_empty() {
            uri.push('/');
        }
        if !self.uri_query.is_empty() {
            uri.push('?');
            uri.push_str(&self.uri_query.join("&"));
        }
        uri
    }
}

/// A response as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapResponse {
    pub code: ResponseCode,
    pub options: ResponseOptions,
    pub payload: Bytes,
}

impl CoapResponse {
    /// Create an empty response with the given code
    pub fn new(code: ResponseCode) -> Self {
        Self {
            code,
            options: ResponseOptions::default(),
            payload: Bytes::new(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_content_format(mut self, format: u16) -> Self {
        self.options.content_format = Some(format);
        self
    }

    pub fn with_observe(mut self, sequence: u32) -> Self {
        self.options.observe = Some(sequence);
        self
    }

    /// Set the Location-Path option from a `/`-separated string
    pub fn with_location_path(mut self, location: &str) -> Self {
        self.options.location_path = location
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        self
    }
}

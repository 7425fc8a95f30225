//! CoAP response codes
//!
//! Codes are stored as the single wire byte `class << 5 | detail`
//! (RFC 7252 §3), so `2.05 Content` is `0x45`.

use std::fmt;
use std::str::FromStr;

use crate::error::{BridgeError, Result};

/// Response codes a CoAP transport can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseCode {
    // 2.xx Success
    Created = 0x41,
    Deleted = 0x42,
    Valid = 0x43,
    Changed = 0x44,
    Content = 0x45,
    Continue = 0x5f,

    // 4.xx Client Error
    BadRequest = 0x80,
    Unauthorized = 0x81,
    BadOption = 0x82,
    Forbidden = 0x83,
    NotFound = 0x84,
    MethodNotAllowed = 0x85,
    NotAcceptable = 0x86,
    RequestEntityIncomplete = 0x88,
    Conflict = 0x89,
    PreconditionFailed = 0x8c,
    RequestEntityTooLarge = 0x8d,
    UnsupportedContentFormat = 0x8f,

    // 5.xx Server Error
    InternalServerError = 0xa0,
    NotImplemented = 0xa1,
    BadGateway = 0xa2,
    ServiceUnavailable = 0xa3,
    GatewayTimeout = 0xa4,
    ProxyingNotSupported = 0xa5,
}

impl ResponseCode {
    const ALL: [ResponseCode; 24] = [
        ResponseCode::Created,
        ResponseCode::Deleted,
        ResponseCode::Valid,
        ResponseCode::Changed,
        ResponseCode::Content,
        ResponseCode::Continue,
        ResponseCode::BadRequest,
        ResponseCode::Unauthorized,
        ResponseCode::BadOption,
        ResponseCode::Forbidden,
        ResponseCode::NotFound,
        ResponseCode::MethodNotAllowed,
        ResponseCode::NotAcceptable,
        ResponseCode::RequestEntityIncomplete,
        ResponseCode::Conflict,
        ResponseCode::PreconditionFailed,
        ResponseCode::RequestEntityTooLarge,
        ResponseCode::UnsupportedContentFormat,
        ResponseCode::InternalServerError,
        ResponseCode::NotImplemented,
        ResponseCode::BadGateway,
        ResponseCode::ServiceUnavailable,
        ResponseCode::GatewayTimeout,
        ResponseCode::ProxyingNotSupported,
    ];

    /// Every response code, in wire order
    pub fn all() -> &'static [ResponseCode] {
        &Self::ALL
    }

    /// Look up a code from its wire byte
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.value() == value)
    }

    /// Wire byte of this code
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Code class (2, 4 or 5)
    pub fn class(self) -> u8 {
        self.value() >> 5
    }

    /// Code detail (the `05` of `2.05`)
    pub fn detail(self) -> u8 {
        self.value() & 0x1f
    }

    pub fn is_success(self) -> bool {
        self.class() == 2
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.class(), self.detail())
    }
}

impl FromStr for ResponseCode {
    type Err = BridgeError;

    /// Parse the dotted form (`2.05`)
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BridgeError::Transport(format!("invalid CoAP code: {:?}", s));

        let (class, detail) = s.split_once('.').ok_or_else(invalid)?;
        let class: u8 = class.parse().map_err(|_| invalid())?;
        let detail: u8 = detail.parse().map_err(|_| invalid())?;
        if class > 7 || detail > 31 {
            return Err(invalid());
        }

        let value = (class << 5) | detail;
        Self::from_u8(value).ok_or(BridgeError::UnsupportedStatusCode(value))
    }
}

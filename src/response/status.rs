//! LwM2M result codes
//!
//! The single translation point from CoAP response codes to LwM2M result codes.

use std::fmt;

use serde::Serialize;

use crate::coap::ResponseCode;
use crate::error::{BridgeError, Result};

/// Result codes an LwM2M response can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Created,
    Deleted,
    Changed,
    Content,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
}

impl ResultCode {
    /// True for the 2.xx codes
    pub fn is_success(self) -> bool {
        matches!(
            self,
            ResultCode::Created | ResultCode::Deleted | ResultCode::Changed | ResultCode::Content
        )
    }

    /// The CoAP code this result code was mapped from
    pub fn coap_code(self) -> ResponseCode {
        match self {
            ResultCode::Created => ResponseCode::Created,
            ResultCode::Deleted => ResponseCode::Deleted,
            ResultCode::Changed => ResponseCode::Changed,
            ResultCode::Content => ResponseCode::Content,
            ResultCode::BadRequest => ResponseCode::BadRequest,
            ResultCode::Unauthorized => ResponseCode::Unauthorized,
            ResultCode::Forbidden => ResponseCode::Forbidden,
            ResultCode::NotFound => ResponseCode::NotFound,
            ResultCode::MethodNotAllowed => ResponseCode::MethodNotAllowed,
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultCode::Created => "CREATED",
            ResultCode::Deleted => "DELETED",
            ResultCode::Changed => "CHANGED",
            ResultCode::Content => "CONTENT",
            ResultCode::BadRequest => "BAD_REQUEST",
            ResultCode::Unauthorized => "UNAUTHORIZED",
            ResultCode::Forbidden => "FORBIDDEN",
            ResultCode::NotFound => "NOT_FOUND",
            ResultCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
        };
        f.write_str(name)
    }
}

/// Map a raw CoAP code byte to its LwM2M result code
///
/// Fails with `UnsupportedStatusCode` for anything outside the nine codes
/// LwM2M defines.
pub fn map_status(code: u8) -> Result<ResultCode> {
    match ResponseCode::from_u8(code) {
        Some(ResponseCode::Created) => Ok(ResultCode::Created),
        Some(ResponseCode::Deleted) => Ok(ResultCode::Deleted),
        Some(ResponseCode::Changed) => Ok(ResultCode::Changed),
        Some(ResponseCode::Content) => Ok(ResultCode::Content),
        Some(ResponseCode::BadRequest) => Ok(ResultCode::BadRequest),
        Some(ResponseCode::Unauthorized) => Ok(ResultCode::Unauthorized),
        Some(ResponseCode::Forbidden) => Ok(ResultCode::Forbidden),
        Some(ResponseCode::NotFound) => Ok(ResultCode::NotFound),
        Some(ResponseCode::MethodNotAllowed) => Ok(ResultCode::MethodNotAllowed),
        _ => Err(BridgeError::UnsupportedStatusCode(code)),
    }
}

impl TryFrom<ResponseCode> for ResultCode {
    type Error = BridgeError;

    fn try_from(code: ResponseCode) -> Result<Self> {
        map_status(code.value())
    }
}

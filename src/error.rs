//! Error types for lwm2m-bridge
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::node::LwM2mPath;
use crate::response::ResultCode;

/// Result type alias using BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type for lwm2m-bridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    // -------------------------------------------------------------------------
    // Status Errors
    // -------------------------------------------------------------------------
    /// A CoAP code outside the set LwM2M responses may carry
    #[error("Invalid CoAP code for LwM2M response: {}", format_code(.0))]
    UnsupportedStatusCode(u8),

    /// The device answered with a code the issued operation does not allow
    #[error("Client [{endpoint}] returned unexpected response code [{code}] for [{request_uri}]")]
    UnexpectedResponseCode {
        endpoint: String,
        request_uri: String,
        code: ResultCode,
    },

    // -------------------------------------------------------------------------
    // Content Errors
    // -------------------------------------------------------------------------
    /// The transport reported `code` but the payload could not be decoded
    #[error("Invalid content for [{path}] ({code}): {reason}")]
    InvalidContent {
        code: ResultCode,
        path: String,
        reason: String,
        #[source]
        source: CodecError,
    },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Link format error: {0}")]
    LinkFormat(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // -------------------------------------------------------------------------
    // Observation Errors
    // -------------------------------------------------------------------------
    #[error("Observation registration failed: {0}")]
    Registration(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Transport error: {0}")]
    Transport(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// The LwM2M result code carried by this error, when one is known
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            BridgeError::UnexpectedResponseCode { code, .. } => Some(*code),
            BridgeError::InvalidContent { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Error raised by a payload decoder
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CodecError {
    /// Human-readable reason
    pub message: String,

    /// Path of the node that failed to decode
    pub path: LwM2mPath,
}

impl CodecError {
    pub fn new(message: impl Into<String>, path: LwM2mPath) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }
}

/// Render a raw CoAP code as `class.detail` (e.g. `2.05`)
fn format_code(code: &u8) -> String {
    format!("{}.{:02}", code >> 5, code & 0x1f)
}

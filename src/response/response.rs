//! Response definitions
//!
//! Represents the typed result of a downlink request.

use serde::Serialize;

use crate::link::LinkObject;
use crate::node::LwM2mNode;

use super::ResultCode;

/// Typed response to a downlink request
///
/// Content, links and location are only ever set alongside a success code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LwM2mResponse {
    /// Write, Write-Attributes, Execute, Delete
    Generic { code: ResultCode },

    /// Read, Observe
    Value {
        code: ResultCode,
        content: Option<LwM2mNode>,
    },

    /// Discover
    Discover {
        code: ResultCode,
        links: Option<Vec<LinkObject>>,
    },

    /// Create
    Create {
        code: ResultCode,
        location: Option<String>,
    },
}

impl LwM2mResponse {
    /// Create a response carrying only a result code
    pub fn generic(code: ResultCode) -> Self {
        LwM2mResponse::Generic { code }
    }

    /// Create a successful value response
    pub fn content(content: LwM2mNode) -> Self {
        LwM2mResponse::Value {
            code: ResultCode::Content,
            content: Some(content),
        }
    }

    /// Create a failed value response
    ///
    /// `code` must be a 4.xx result code.
    pub fn value_failure(code: ResultCode) -> Self {
        debug_assert!(!code.is_success(), "value_failure with success code {}", code);
        LwM2mResponse::Value { code, content: None }
    }

    /// Create a successful discover response
    pub fn discovered(links: Vec<LinkObject>) -> Self {
        LwM2mResponse::Discover {
            code: ResultCode::Content,
            links: Some(links),
        }
    }

    /// Create a failed discover response
    pub fn discover_failure(code: ResultCode) -> Self {
        debug_assert!(!code.is_success(), "discover_failure with success code {}", code);
        LwM2mResponse::Discover { code, links: None }
    }

    /// Create a successful create response
    pub fn created(location: Option<String>) -> Self {
        LwM2mResponse::Create {
            code: ResultCode::Created,
            location,
        }
    }

    /// Create a failed create response
    pub fn create_failure(code: ResultCode) -> Self {
        debug_assert!(!code.is_success(), "create_failure with success code {}", code);
        LwM2mResponse::Create { code, location: None }
    }

    /// Get the result code
    pub fn code(&self) -> ResultCode {
        match self {
            LwM2mResponse::Generic { code }
            | LwM2mResponse::Value { code, .. }
            | LwM2mResponse::Discover { code, .. }
            | LwM2mResponse::Create { code, .. } => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code().is_success()
    }

    /// Decoded content of a value response
    pub fn node(&self) -> Option<&LwM2mNode> {
        match self {
            LwM2mResponse::Value { content, .. } => content.as_ref(),
            _ => None,
        }
    }

    /// Links of a discover response
    pub fn links(&self) -> Option<&[LinkObject]> {
        match self {
            LwM2mResponse::Discover { links, .. } => links.as_deref(),
            _ => None,
        }
    }

    /// Location of a create response
    pub fn location(&self) -> Option<&str> {
        match self {
            LwM2mResponse::Create { location, .. } => location.as_deref(),
            _ => None,
        }
    }
}

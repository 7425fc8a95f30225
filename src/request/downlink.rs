//! Downlink request definitions
//!
//! Represents operations the server issues against a device.

use bytes::Bytes;

use crate::coap::ContentFormat;
use crate::node::LwM2mPath;

/// Request kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Read,
    Discover,
    Write,
    WriteAttributes,
    Execute,
    Create,
    Delete,
    Observe,
}

impl RequestKind {
    const ALL: [RequestKind; 8] = [
        RequestKind::Read,
        RequestKind::Discover,
        RequestKind::Write,
        RequestKind::WriteAttributes,
        RequestKind::Execute,
        RequestKind::Create,
        RequestKind::Delete,
        RequestKind::Observe,
    ];

    pub fn all() -> &'static [RequestKind] {
        &Self::ALL
    }
}

/// Encoded content sent with a write or create
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub format: ContentFormat,
    pub bytes: Bytes,
}

impl Payload {
    pub fn new(format: ContentFormat, bytes: impl Into<Bytes>) -> Self {
        Self {
            format,
            bytes: bytes.into(),
        }
    }
}

/// Write semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the whole target (PUT)
    Replace,

    /// Partial update (POST)
    Update,
}

/// Notification attributes set with Write-Attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationAttributes {
    /// Minimum period (seconds)
    pub pmin: Option<u32>,

    /// Maximum period (seconds)
    pub pmax: Option<u32>,

    /// Greater than
    pub gt: Option<f64>,

    /// Less than
    pub lt: Option<f64>,

    /// Step
    pub st: Option<f64>,
}

impl NotificationAttributes {
    /// Uri-Query entries, in protocol order
    pub fn to_query(&self) -> Vec<String> {
        let mut query = Vec::new();
        if let Some(pmin) = self.pmin {
            query.push(format!("pmin={}", pmin));
        }
        if let Some(pmax) = self.pmax {
            query.push(format!("pmax={}", pmax));
        }
        if let Some(gt) = self.gt {
            query.push(format!("gt={}", gt));
        }
        if let Some(lt) = self.lt {
            query.push(format!("lt={}", lt));
        }
        if let Some(st) = self.st {
            query.push(format!("st={}", st));
        }
        query
    }
}

/// An operation issued against a device
#[derive(Debug, Clone, PartialEq)]
pub enum DownlinkRequest {
    /// Read the value(s) under a path
    Read { path: LwM2mPath },

    /// List the objects, instances and attributes under a path
    Discover { path: LwM2mPath },

    /// Write a value
    Write {
        path: LwM2mPath,
        payload: Payload,
        mode: WriteMode,
    },

    /// Set notification attributes
    WriteAttributes {
        path: LwM2mPath,
        attributes: NotificationAttributes,
    },

    /// Trigger an executable resource
    Execute {
        path: LwM2mPath,
        arguments: Option<String>,
    },

    /// Create an object instance
    Create { path: LwM2mPath, payload: Payload },

    /// Delete an object instance
    Delete { path: LwM2mPath },

    /// Read and subscribe to changes
    Observe { path: LwM2mPath },
}

impl DownlinkRequest {
    pub fn read(path: LwM2mPath) -> Self {
        DownlinkRequest::Read { path }
    }

    pub fn discover(path: LwM2mPath) -> Self {
        DownlinkRequest::Discover { path }
    }

    pub fn observe(path: LwM2mPath) -> Self {
        DownlinkRequest::Observe { path }
    }

    pub fn delete(path: LwM2mPath) -> Self {
        DownlinkRequest::Delete { path }
    }

    /// Get the request kind
    pub fn kind(&self) -> RequestKind {
        match self {
            DownlinkRequest::Read { .. } => RequestKind::Read,
            DownlinkRequest::Discover { .. } => RequestKind::Discover,
            DownlinkRequest::Write { .. } => RequestKind::Write,
            DownlinkRequest::WriteAttributes { .. } => RequestKind::WriteAttributes,
            DownlinkRequest::Execute { .. } => RequestKind::Execute,
            DownlinkRequest::Create { .. } => RequestKind::Create,
            DownlinkRequest::Delete { .. } => RequestKind::Delete,
            DownlinkRequest::Observe { .. } => RequestKind::Observe,
        }
    }

    /// Get the target path
    pub fn path(&self) -> &LwM2mPath {
        match self {
            DownlinkRequest::Read { path }
            | DownlinkRequest::Discover { path }
            | DownlinkRequest::Write { path, .. }
            | DownlinkRequest::WriteAttributes { path, .. }
            | DownlinkRequest::Execute { path, .. }
            | DownlinkRequest::Create { path, .. }
            | DownlinkRequest::Delete { path }
            | DownlinkRequest::Observe { path } => path,
        }
    }
}

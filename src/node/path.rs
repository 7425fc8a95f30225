//! LwM2M path
//!
//! Addresses an object, an object instance or a resource on a device.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{BridgeError, Result};

/// Path to an LwM2M node: `/{object}[/{instance}[/{resource}]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LwM2mPath {
    object_id: u16,
    object_instance_id: Option<u16>,
    resource_id: Option<u16>,
}

impl LwM2mPath {
    /// Path to an object
    pub fn object(object_id: u16) -> Self {
        Self {
            object_id,
            object_instance_id: None,
            resource_id: None,
        }
    }

    /// Path to an object instance
    pub fn object_instance(object_id: u16, instance_id: u16) -> Self {
        Self {
            object_id,
            object_instance_id: Some(instance_id),
            resource_id: None,
        }
    }

    /// Path to a resource
    pub fn resource(object_id: u16, instance_id: u16, resource_id: u16) -> Self {
        Self {
            object_id,
            object_instance_id: Some(instance_id),
            resource_id: Some(resource_id),
        }
    }

    pub fn object_id(&self) -> u16 {
        self.object_id
    }

    pub fn object_instance_id(&self) -> Option<u16> {
        self.object_instance_id
    }

    pub fn resource_id(&self) -> Option<u16> {
        self.resource_id
    }

    pub fn is_object(&self) -> bool {
        self.object_instance_id.is_none()
    }

    pub fn is_object_instance(&self) -> bool {
        self.object_instance_id.is_some() && self.resource_id.is_none()
    }

    pub fn is_resource(&self) -> bool {
        self.resource_id.is_some()
    }

    /// Path segments in order (1 to 3 items)
    pub fn segments(&self) -> Vec<u16> {
        let mut segments = vec![self.object_id];
        segments.extend(self.object_instance_id);
        segments.extend(self.resource_id);
        segments
    }

    /// Append a child id to this path
    ///
    /// Returns `None` when the path already addresses a resource.
    pub fn child(&self, id: u16) -> Option<Self> {
        match (self.object_instance_id, self.resource_id) {
            (None, _) => Some(Self::object_instance(self.object_id, id)),
            (Some(instance), None) => Some(Self::resource(self.object_id, instance, id)),
            (Some(_), Some(_)) => None,
        }
    }
}

impl FromStr for LwM2mPath {
    type Err = BridgeError;

    /// Parse `/3`, `/3/0`, `/3/0/1` (leading and trailing slashes optional)
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim_matches('/');
        if trimmed.is_empty() {
            return Err(BridgeError::InvalidPath(format!("empty path: {:?}", s)));
        }

        let mut ids = Vec::with_capacity(3);
        for segment in trimmed.split('/') {
            let id = segment
                .parse::<u16>()
                .map_err(|_| BridgeError::InvalidPath(format!("bad segment {:?} in {:?}", segment, s)))?;
            ids.push(id);
        }

        match ids.as_slice() {
            [object] => Ok(Self::object(*object)),
            [object, instance] => Ok(Self::object_instance(*object, *instance)),
            [object, instance, resource] => Ok(Self::resource(*object, *instance, *resource)),
            _ => Err(BridgeError::InvalidPath(format!(
                "too many segments ({}) in {:?}",
                ids.len(),
                s
            ))),
        }
    }
}

impl fmt::Display for LwM2mPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.object_id)?;
        if let Some(instance) = self.object_instance_id {
            write!(f, "/{}", instance)?;
        }
        if let Some(resource) = self.resource_id {
            write!(f, "/{}", resource)?;
        }
        Ok(())
    }
}

impl Serialize for LwM2mPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

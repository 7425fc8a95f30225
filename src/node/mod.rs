//! Node Module
//!
//! Domain model for the values a device exposes.
//!
//! ## Structure
//! ```text
//! Object (/3)
//!   └── ObjectInstance (/3/0)
//!         └── Resource (/3/0/9)
//!               ├── Single(Value)
//!               └── Multiple { instance id → Value }
//! ```

mod path;
mod model;

pub use path::LwM2mPath;
pub use model::{ObjectModel, ValueType};

use std::collections::BTreeMap;

use serde::Serialize;

/// A decoded node of the device's object tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LwM2mNode {
    /// Every instance of an object
    Object(Object),

    /// One object instance with its resources
    ObjectInstance(ObjectInstance),

    /// A single resource
    Resource(Resource),
}

/// An object with its instances, keyed by instance id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    pub id: u16,
    pub instances: BTreeMap<u16, ObjectInstance>,
}

/// An object instance with its resources, keyed by resource id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInstance {
    pub id: u16,
    pub resources: BTreeMap<u16, Resource>,
}

/// A resource and its value(s)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub id: u16,
    pub value: ResourceValue,
}

/// Single-instance or multiple-instance resource content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceValue {
    Single(Value),
    Multiple(BTreeMap<u16, Value>),
}

/// A typed resource value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Opaque(Vec<u8>),
    /// Seconds since the Unix epoch
    Time(i64),
}

impl Resource {
    pub fn single(id: u16, value: Value) -> Self {
        Self {
            id,
            value: ResourceValue::Single(value),
        }
    }

    pub fn multiple(id: u16, values: BTreeMap<u16, Value>) -> Self {
        Self {
            id,
            value: ResourceValue::Multiple(values),
        }
    }

    /// The value of a single-instance resource
    pub fn value(&self) -> Option<&Value> {
        match &self.value {
            ResourceValue::Single(value) => Some(value),
            ResourceValue::Multiple(_) => None,
        }
    }
}

impl ObjectInstance {
    pub fn new(id: u16, resources: impl IntoIterator<Item = Resource>) -> Self {
        Self {
            id,
            resources: resources.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}

impl Object {
    pub fn new(id: u16, instances: impl IntoIterator<Item = ObjectInstance>) -> Self {
        Self {
            id,
            instances: instances.into_iter().map(|i| (i.id, i)).collect(),
        }
    }
}

impl LwM2mNode {
    /// Id of the node at its own level (object, instance or resource id)
    pub fn id(&self) -> u16 {
        match self {
            LwM2mNode::Object(object) => object.id,
            LwM2mNode::ObjectInstance(instance) => instance.id,
            LwM2mNode::Resource(resource) => resource.id,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            LwM2mNode::Resource(resource) => Some(resource),
            _ => None,
        }
    }
}

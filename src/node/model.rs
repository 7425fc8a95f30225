//! Object model
//!
//! TLV and plain-text payloads carry no type information, so decoders look up
//! the expected type of each resource here.

use std::collections::HashMap;

/// Declared type of a resource value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    Opaque,
    Time,
}

/// Resource type table keyed by (object id, resource id)
#[derive(Debug, Clone, Default)]
pub struct ObjectModel {
    types: HashMap<(u16, u16), ValueType>,
}

impl ObjectModel {
    /// An empty model: every resource is treated as untyped
    pub fn new() -> Self {
        Self::default()
    }

    /// Model for the core objects every LwM2M client implements
    /// (Security 0, Server 1, Device 3)
    pub fn core() -> Self {
        use ValueType::*;

        let mut model = Self::new();

        // Security (0)
        model.define(0, 0, String); // LwM2M Server URI
        model.define(0, 1, Boolean); // Bootstrap-Server
        model.define(0, 2, Integer); // Security Mode
        model.define(0, 3, Opaque); // Public Key or Identity
        model.define(0, 10, Integer); // Short Server ID

        // Server (1)
        model.define(1, 0, Integer); // Short Server ID
        model.define(1, 1, Integer); // Lifetime
        model.define(1, 2, Integer); // Default Minimum Period
        model.define(1, 3, Integer); // Default Maximum Period
        model.define(1, 5, Integer); // Disable Timeout
        model.define(1, 6, Boolean); // Notification Storing
        model.define(1, 7, String); // Binding

        // Device (3)
        model.define(3, 0, String); // Manufacturer
        model.define(3, 1, String); // Model Number
        model.define(3, 2, String); // Serial Number
        model.define(3, 3, String); // Firmware Version
        model.define(3, 6, Integer); // Available Power Sources
        model.define(3, 7, Integer); // Power Source Voltage
        model.define(3, 8, Integer); // Power Source Current
        model.define(3, 9, Integer); // Battery Level
        model.define(3, 10, Integer); // Memory Free
        model.define(3, 11, Integer); // Error Code
        model.define(3, 13, Time); // Current Time
        model.define(3, 14, String); // UTC Offset
        model.define(3, 15, String); // Timezone
        model.define(3, 16, String); // Supported Binding and Modes
        model.define(3, 17, String); // Device Type
        model.define(3, 18, String); // Hardware Version
        model.define(3, 19, String); // Software Version
        model.define(3, 20, Integer); // Battery Status
        model.define(3, 21, Integer); // Memory Total

        model
    }

    /// Declare the type of a resource
    pub fn define(&mut self, object_id: u16, resource_id: u16, value_type: ValueType) {
        self.types.insert((object_id, resource_id), value_type);
    }

    /// Look up the declared type of a resource
    pub fn value_type(&self, object_id: u16, resource_id: u16) -> Option<ValueType> {
        self.types.get(&(object_id, resource_id)).copied()
    }
}

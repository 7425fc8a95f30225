//! LwM2M JSON decoding (`application/vnd.oma.lwm2m+json`)
//!
//! ```text
//! {"bn":"/3/0/","e":[{"n":"0","sv":"ACME"},{"n":"9","v":87},{"n":"6/0","v":1}]}
//! ```
//!
//! Entry names are resolved against `bn` (or the request path when `bn` is
//! absent) and must land on a resource or a resource instance.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::CodecError;
use crate::node::{LwM2mNode, LwM2mPath, Object, ObjectInstance, ObjectModel, Resource, Value, ValueType};

#[derive(Debug, Deserialize)]
struct JsonDocument {
    #[serde(default)]
    bn: Option<String>,
    e: Vec<JsonEntry>,
}

#[derive(Debug, Deserialize)]
struct JsonEntry {
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    v: Option<serde_json::Number>,
    #[serde(default)]
    sv: Option<String>,
    #[serde(default)]
    bv: Option<bool>,
    #[serde(default)]
    ov: Option<String>,
}

/// Per-resource accumulator: single value or resource instances
enum Slot {
    Single(Value),
    Multiple(BTreeMap<u16, Value>),
}

/// Decode a JSON payload into the node addressed by `path`
pub fn decode(bytes: &[u8], path: &LwM2mPath, model: &ObjectModel) -> Result<LwM2mNode, CodecError> {
    let fail = |message: String| CodecError::new(message, *path);

    let document: JsonDocument =
        serde_json::from_slice(bytes).map_err(|e| fail(format!("Invalid JSON: {}", e)))?;

    let base = document.bn.clone().unwrap_or_else(|| format!("{}/", path));

    // instance id → resource id → slot
    let mut tree: BTreeMap<u16, BTreeMap<u16, Slot>> = BTreeMap::new();

    for entry in &document.e {
        let name = format!("{}{}", base, entry.n.as_deref().unwrap_or(""));
        let ids = parse_ids(&name).map_err(fail)?;

        let (object_id, instance_id, resource_id, resource_instance) = match ids.as_slice() {
            [o, i, r] => (*o, *i, *r, None),
            [o, i, r, ri] => (*o, *i, *r, Some(*ri)),
            _ => return Err(fail(format!("Entry {:?} does not address a resource", name))),
        };

        if object_id != path.object_id()
            || path.object_instance_id().is_some_and(|id| id != instance_id)
            || path.resource_id().is_some_and(|id| id != resource_id)
        {
            return Err(fail(format!("Entry {:?} is outside of {}", name, path)));
        }

        let value = entry_value(entry, model.value_type(object_id, resource_id)).map_err(fail)?;
        let resources = tree.entry(instance_id).or_default();

        match (resource_instance, resources.get_mut(&resource_id)) {
            (None, None) => {
                resources.insert(resource_id, Slot::Single(value));
            }
            (Some(ri), None) => {
                resources.insert(resource_id, Slot::Multiple(BTreeMap::from([(ri, value)])));
            }
            (Some(ri), Some(Slot::Multiple(values))) => {
                values.insert(ri, value);
            }
            _ => return Err(fail(format!("Conflicting entries for {}", name))),
        }
    }

    let mut instances: Vec<ObjectInstance> = tree
        .into_iter()
        .map(|(instance_id, resources)| {
            ObjectInstance::new(
                instance_id,
                resources.into_iter().map(|(id, slot)| match slot {
                    Slot::Single(value) => Resource::single(id, value),
                    Slot::Multiple(values) => Resource::multiple(id, values),
                }),
            )
        })
        .collect();

    if let Some(resource_id) = path.resource_id() {
        let resource = instances
            .pop()
            .and_then(|mut instance| instance.resources.remove(&resource_id))
            .ok_or_else(|| fail(format!("No value for resource {}", path)))?;
        return Ok(LwM2mNode::Resource(resource));
    }

    if let Some(instance_id) = path.object_instance_id() {
        let instance = instances
            .pop()
            .unwrap_or_else(|| ObjectInstance::new(instance_id, Vec::new()));
        return Ok(LwM2mNode::ObjectInstance(instance));
    }

    Ok(LwM2mNode::Object(Object::new(path.object_id(), instances)))
}

fn parse_ids(name: &str) -> std::result::Result<Vec<u16>, String> {
    name.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .parse::<u16>()
                .map_err(|_| format!("Invalid segment {:?} in entry name {:?}", segment, name))
        })
        .collect()
}

fn entry_value(entry: &JsonEntry, value_type: Option<ValueType>) -> std::result::Result<Value, String> {
    if let Some(number) = &entry.v {
        return match value_type {
            Some(ValueType::Float) => number
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| format!("Invalid float {}", number)),
            Some(ValueType::Time) => number
                .as_i64()
                .map(Value::Time)
                .ok_or_else(|| format!("Invalid time {}", number)),
            Some(ValueType::Integer) => number
                .as_i64()
                .map(Value::Integer)
                .ok_or_else(|| format!("Invalid integer {}", number)),
            _ => match (number.as_i64(), number.as_f64()) {
                (Some(integer), _) => Ok(Value::Integer(integer)),
                (None, Some(float)) => Ok(Value::Float(float)),
                (None, None) => Err(format!("Unrepresentable number {}", number)),
            },
        };
    }
    if let Some(text) = &entry.sv {
        return Ok(Value::String(text.clone()));
    }
    if let Some(flag) = entry.bv {
        return Ok(Value::Boolean(flag));
    }
    if let Some(link) = &entry.ov {
        return Ok(Value::String(link.clone()));
    }
    Err("Entry carries no value".to_string())
}

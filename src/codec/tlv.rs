//! LwM2M TLV decoding
//!
//! ## Entry Format
//! ```text
//! ┌──────────┬──────────────┬──────────────┬─────────────────┐
//! │ Type (1) │ Id (1 or 2)  │ Len (0 - 3)  │      Value      │
//! └──────────┴──────────────┴──────────────┴─────────────────┘
//! ```
//!
//! ### Type Byte
//! - bits 7-6: identifier kind (00 instance, 01 resource instance,
//!   10 multiple resource, 11 resource with value)
//! - bit 5:    identifier width (0 = 8 bits, 1 = 16 bits)
//! - bits 4-3: length width in bytes (0 = length in bits 2-0)
//! - bits 2-0: length when bits 4-3 are 0

use std::collections::BTreeMap;

use crate::error::CodecError;
use crate::node::{LwM2mNode, LwM2mPath, Object, ObjectInstance, ObjectModel, Resource, Value, ValueType};

/// Identifier kind of a TLV entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlvType {
    ObjectInstance,
    ResourceInstance,
    MultipleResource,
    Resource,
}

/// A parsed TLV entry
#[derive(Debug, Clone, PartialEq)]
pub struct Tlv {
    pub kind: TlvType,
    pub id: u16,
    pub content: TlvContent,
}

/// Raw value bytes, or nested entries for container kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TlvContent {
    Value(Vec<u8>),
    Children(Vec<Tlv>),
}

/// Parse a buffer into a flat sequence of TLV entries (containers recurse)
///
/// An object instance may only hold resources and a multiple resource only
/// resource instances, so nesting never goes deeper than three levels.
pub fn parse_tlv(bytes: &[u8]) -> std::result::Result<Vec<Tlv>, String> {
    parse_level(bytes, None)
}

fn parse_level(bytes: &[u8], parent: Option<TlvType>) -> std::result::Result<Vec<Tlv>, String> {
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let type_byte = bytes[offset];
        offset += 1;

        let kind = match type_byte >> 6 {
            0b00 => TlvType::ObjectInstance,
            0b01 => TlvType::ResourceInstance,
            0b10 => TlvType::MultipleResource,
            _ => TlvType::Resource,
        };

        if let Some(parent) = parent {
            let allowed = match parent {
                TlvType::ObjectInstance => matches!(kind, TlvType::Resource | TlvType::MultipleResource),
                TlvType::MultipleResource => kind == TlvType::ResourceInstance,
                TlvType::ResourceInstance | TlvType::Resource => false,
            };
            if !allowed {
                return Err(format!(
                    "{:?} TLV at offset {} cannot be nested in {:?}",
                    kind,
                    offset - 1,
                    parent
                ));
            }
        }

        // Identifier
        let id_len = if type_byte & 0x20 != 0 { 2 } else { 1 };
        if bytes.len() < offset + id_len {
            return Err(format!(
                "Incomplete TLV identifier at offset {}: expected {} bytes, got {}",
                offset,
                id_len,
                bytes.len() - offset
            ));
        }
        let id = if id_len == 2 {
            u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
        } else {
            bytes[offset] as u16
        };
        offset += id_len;

        // Length
        let length_width = ((type_byte >> 3) & 0x03) as usize;
        let length = if length_width == 0 {
            (type_byte & 0x07) as usize
        } else {
            if bytes.len() < offset + length_width {
                return Err(format!(
                    "Incomplete TLV length at offset {}: expected {} bytes, got {}",
                    offset,
                    length_width,
                    bytes.len() - offset
                ));
            }
            let length = bytes[offset..offset + length_width]
                .iter()
                .fold(0usize, |acc, b| (acc << 8) | *b as usize);
            offset += length_width;
            length
        };

        // Value
        if bytes.len() < offset + length {
            return Err(format!(
                "Incomplete TLV value for id {}: expected {} bytes, got {}",
                id,
                length,
                bytes.len() - offset
            ));
        }
        let value = &bytes[offset..offset + length];
        offset += length;

        let content = match kind {
            TlvType::ObjectInstance | TlvType::MultipleResource => TlvContent::Children(parse_level(value, Some(kind))?),
            TlvType::ResourceInstance | TlvType::Resource => TlvContent::Value(value.to_vec()),
        };

        entries.push(Tlv { kind, id, content });
    }

    Ok(entries)
}

/// Decode a TLV payload into the node addressed by `path`
pub fn decode(bytes: &[u8], path: &LwM2mPath, model: &ObjectModel) -> Result<LwM2mNode, CodecError> {
    let fail = |message: String| CodecError::new(message, *path);

    let entries = parse_tlv(bytes).map_err(fail)?;
    let object_id = path.object_id();

    if let Some(resource_id) = path.resource_id() {
        let resource = match entries.as_slice() {
            [single] if matches!(single.kind, TlvType::Resource | TlvType::MultipleResource) => {
                if single.id != resource_id {
                    return Err(fail(format!(
                        "Id mismatch: expected resource {}, got {}",
                        resource_id, single.id
                    )));
                }
                to_resource(single, object_id, model).map_err(fail)?
            }
            many if !many.is_empty() && many.iter().all(|e| e.kind == TlvType::ResourceInstance) => {
                let values = to_instances(many, object_id, resource_id, model).map_err(fail)?;
                Resource::multiple(resource_id, values)
            }
            _ => return Err(fail("Expected a single resource TLV".to_string())),
        };
        return Ok(LwM2mNode::Resource(resource));
    }

    if let Some(instance_id) = path.object_instance_id() {
        let resources = match entries.as_slice() {
            [wrapper] if wrapper.kind == TlvType::ObjectInstance => {
                if wrapper.id != instance_id {
                    return Err(fail(format!(
                        "Id mismatch: expected instance {}, got {}",
                        instance_id, wrapper.id
                    )));
                }
                children(wrapper)
            }
            _ => &entries[..],
        };
        let instance = to_object_instance(instance_id, resources, object_id, model).map_err(fail)?;
        return Ok(LwM2mNode::ObjectInstance(instance));
    }

    // Object: a list of instances, or bare resources for a single-instance object
    let instances = if entries.iter().all(|e| e.kind == TlvType::ObjectInstance) {
        entries
            .iter()
            .map(|e| to_object_instance(e.id, children(e), object_id, model))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(fail)?
    } else {
        vec![to_object_instance(0, &entries, object_id, model).map_err(fail)?]
    };
    Ok(LwM2mNode::Object(Object::new(object_id, instances)))
}

fn children(tlv: &Tlv) -> &[Tlv] {
    match &tlv.content {
        TlvContent::Children(children) => children,
        TlvContent::Value(_) => &[],
    }
}

fn to_object_instance(
    instance_id: u16,
    entries: &[Tlv],
    object_id: u16,
    model: &ObjectModel,
) -> std::result::Result<ObjectInstance, String> {
    let resources = entries
        .iter()
        .map(|e| to_resource(e, object_id, model))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ObjectInstance::new(instance_id, resources))
}

fn to_resource(tlv: &Tlv, object_id: u16, model: &ObjectModel) -> std::result::Result<Resource, String> {
    match (&tlv.kind, &tlv.content) {
        (TlvType::Resource, TlvContent::Value(bytes)) => {
            let value = typed_value(bytes, model.value_type(object_id, tlv.id))?;
            Ok(Resource::single(tlv.id, value))
        }
        (TlvType::MultipleResource, TlvContent::Children(instances)) => {
            let values = to_instances(instances, object_id, tlv.id, model)?;
            Ok(Resource::multiple(tlv.id, values))
        }
        (kind, _) => Err(format!("Unexpected {:?} TLV (id {}) where a resource was expected", kind, tlv.id)),
    }
}

fn to_instances(
    entries: &[Tlv],
    object_id: u16,
    resource_id: u16,
    model: &ObjectModel,
) -> std::result::Result<BTreeMap<u16, Value>, String> {
    let value_type = model.value_type(object_id, resource_id);
    let mut values = BTreeMap::new();
    for entry in entries {
        match (&entry.kind, &entry.content) {
            (TlvType::ResourceInstance, TlvContent::Value(bytes)) => {
                values.insert(entry.id, typed_value(bytes, value_type)?);
            }
            (kind, _) => {
                return Err(format!(
                    "Unexpected {:?} TLV (id {}) inside multiple resource {}",
                    kind, entry.id, resource_id
                ))
            }
        }
    }
    Ok(values)
}

/// Interpret raw TLV value bytes; untyped resources stay opaque
fn typed_value(bytes: &[u8], value_type: Option<ValueType>) -> std::result::Result<Value, String> {
    match value_type {
        Some(ValueType::String) => String::from_utf8(bytes.to_vec())
            .map(Value::String)
            .map_err(|e| format!("Invalid UTF-8 string: {}", e)),
        Some(ValueType::Integer) => decode_integer(bytes).map(Value::Integer),
        Some(ValueType::Time) => decode_integer(bytes).map(Value::Time),
        Some(ValueType::Float) => decode_float(bytes).map(Value::Float),
        Some(ValueType::Boolean) => match bytes {
            [0] => Ok(Value::Boolean(false)),
            [1] => Ok(Value::Boolean(true)),
            _ => Err(format!("Invalid boolean value: {:02x?}", bytes)),
        },
        Some(ValueType::Opaque) | None => Ok(Value::Opaque(bytes.to_vec())),
    }
}

fn decode_integer(bytes: &[u8]) -> std::result::Result<i64, String> {
    match bytes.len() {
        1 => Ok(bytes[0] as i8 as i64),
        2 => Ok(i16::from_be_bytes([bytes[0], bytes[1]]) as i64),
        4 => Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64),
        8 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(bytes);
            Ok(i64::from_be_bytes(buf))
        }
        n => Err(format!("Invalid integer length: {} bytes", n)),
    }
}

fn decode_float(bytes: &[u8]) -> std::result::Result<f64, String> {
    match bytes.len() {
        4 => Ok(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64),
        8 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(bytes);
            Ok(f64::from_be_bytes(buf))
        }
        n => Err(format!("Invalid float length: {} bytes", n)),
    }
}

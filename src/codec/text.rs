//! Plain text and opaque decoding
//!
//! Both formats carry exactly one single-instance resource.

use crate::error::CodecError;
use crate::node::{LwM2mNode, LwM2mPath, ObjectModel, Resource, Value, ValueType};

/// Decode a `text/plain` payload
pub fn decode_text(bytes: &[u8], path: &LwM2mPath, model: &ObjectModel) -> Result<LwM2mNode, CodecError> {
    let resource_id = require_resource(path, "text")?;

    let text = std::str::from_utf8(bytes)
        .map_err(|e| CodecError::new(format!("Invalid UTF-8 text: {}", e), *path))?;

    let value = match model.value_type(path.object_id(), resource_id) {
        Some(ValueType::Integer) => Value::Integer(parse(text, path)?),
        Some(ValueType::Time) => Value::Time(parse(text, path)?),
        Some(ValueType::Float) => Value::Float(parse(text, path)?),
        Some(ValueType::Boolean) => match text.trim() {
            "0" => Value::Boolean(false),
            "1" => Value::Boolean(true),
            other => {
                return Err(CodecError::new(format!("Invalid boolean value: {:?}", other), *path));
            }
        },
        Some(ValueType::Opaque) => {
            return Err(CodecError::new("Opaque resources cannot be sent as text", *path));
        }
        Some(ValueType::String) | None => Value::String(text.to_string()),
    };

    Ok(LwM2mNode::Resource(Resource::single(resource_id, value)))
}

/// Decode an `application/octet-stream` payload
pub fn decode_opaque(bytes: &[u8], path: &LwM2mPath) -> Result<LwM2mNode, CodecError> {
    let resource_id = require_resource(path, "opaque")?;
    Ok(LwM2mNode::Resource(Resource::single(resource_id, Value::Opaque(bytes.to_vec()))))
}

fn require_resource(path: &LwM2mPath, format: &str) -> Result<u16, CodecError> {
    path.resource_id().ok_or_else(|| {
        CodecError::new(format!("Content format {} is only valid for a single resource", format), *path)
    })
}

fn parse<T: std::str::FromStr>(text: &str, path: &LwM2mPath) -> Result<T, CodecError>
where
    T::Err: std::fmt::Display,
{
    text.trim()
        .parse::<T>()
        .map_err(|e| CodecError::new(format!("Invalid numeric value {:?}: {}", text, e), *path))
}

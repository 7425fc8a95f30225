//! Codec Module
//!
//! Turns response payloads into [`LwM2mNode`] values.
//!
//! ## Supported Formats
//! - text/plain (0):                       single resource
//! - application/octet-stream (42):        single opaque resource
//! - application/vnd.oma.lwm2m+tlv (11542): any node
//! - application/vnd.oma.lwm2m+json (11543): any node

pub mod tlv;
mod text;
mod json;

use crate::coap::ContentFormat;
use crate::error::CodecError;
use crate::node::{LwM2mNode, LwM2mPath, ObjectModel};

/// Decodes a payload for a given path and content format
pub trait NodeDecoder: Send + Sync {
    fn decode(&self, payload: &[u8], format: ContentFormat, path: &LwM2mPath) -> Result<LwM2mNode, CodecError>;
}

/// Decoder for every LwM2M 1.0 content format
#[derive(Debug, Clone)]
pub struct DefaultDecoder {
    model: ObjectModel,
}

impl DefaultDecoder {
    /// Create a decoder typing TLV and text values with `model`
    pub fn new(model: ObjectModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &ObjectModel {
        &self.model
    }
}

/// Resolve the Content-Format option of a response carrying node content
///
/// When the option is absent a single resource is assumed to be plain text and
/// anything wider TLV.
pub fn resolve_format(content_format: Option<u16>, path: &LwM2mPath) -> Result<ContentFormat, CodecError> {
    match content_format {
        Some(code) => ContentFormat::from_code(code)
            .ok_or_else(|| CodecError::new(format!("Unsupported content format {}", code), *path)),
        None if path.is_resource() => Ok(ContentFormat::Text),
        None => Ok(ContentFormat::Tlv),
    }
}

impl Default for DefaultDecoder {
    fn default() -> Self {
        Self::new(ObjectModel::core())
    }
}

impl NodeDecoder for DefaultDecoder {
    fn decode(&self, payload: &[u8], format: ContentFormat, path: &LwM2mPath) -> Result<LwM2mNode, CodecError> {
        match format {
            ContentFormat::Text => text::decode_text(payload, path, &self.model),
            ContentFormat::Opaque => text::decode_opaque(payload, path),
            ContentFormat::Tlv => tlv::decode(payload, path, &self.model),
            ContentFormat::Json => json::decode(payload, path, &self.model),
            ContentFormat::Link => Err(CodecError::new(
                "application/link-format does not carry node values",
                *path,
            )),
        }
    }
}

//! Link Module
//!
//! CoRE link-format (RFC 6690) parsing for discover responses.
//!
//! ```text
//! </3/0>;ct=11542,</3/0/9>;pmin=10;pmax=60,</5>;title="FW, v2"
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{BridgeError, Result};

/// One discovered link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkObject {
    /// Target between `<` and `>`
    pub url: String,

    /// Link attributes in name order
    pub attributes: BTreeMap<String, LinkAttribute>,
}

/// Value of a link attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LinkAttribute {
    /// Attribute present without a value (`;obs`)
    Flag,
    Integer(i64),
    Text(String),
}

impl LinkObject {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: LinkAttribute) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&LinkAttribute> {
        self.attributes.get(name)
    }
}

impl fmt::Display for LinkObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.url)?;
        for (name, value) in &self.attributes {
            match value {
                LinkAttribute::Flag => write!(f, ";{}", name)?,
                LinkAttribute::Integer(n) => write!(f, ";{}={}", name, n)?,
                LinkAttribute::Text(text) => write!(f, ";{}=\"{}\"", name, text)?,
            }
        }
        Ok(())
    }
}

/// Parse a link-format payload into its links, in order
pub fn parse(bytes: &[u8]) -> Result<Vec<LinkObject>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| BridgeError::LinkFormat(format!("payload is not UTF-8: {}", e)))?;

    split_outside_quotes(text, ',')
        .into_iter()
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(parse_link)
        .collect()
}

fn parse_link(link: &str) -> Result<LinkObject> {
    let rest = link
        .strip_prefix('<')
        .ok_or_else(|| BridgeError::LinkFormat(format!("link must start with '<': {:?}", link)))?;
    let end = rest
        .find('>')
        .ok_or_else(|| BridgeError::LinkFormat(format!("unterminated link target: {:?}", link)))?;

    let mut object = LinkObject::new(&rest[..end]);

    for param in split_outside_quotes(&rest[end + 1..], ';') {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        let (name, value) = match param.split_once('=') {
            Some((name, raw)) => (name.trim(), parse_value(raw.trim())),
            None => (param, LinkAttribute::Flag),
        };
        if name.is_empty() {
            return Err(BridgeError::LinkFormat(format!("empty attribute name in {:?}", link)));
        }
        object.attributes.insert(name.to_string(), value);
    }

    Ok(object)
}

fn parse_value(raw: &str) -> LinkAttribute {
    if let Some(quoted) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return LinkAttribute::Text(quoted.to_string());
    }
    match raw.parse::<i64>() {
        Ok(n) => LinkAttribute::Integer(n),
        Err(_) => LinkAttribute::Text(raw.to_string()),
    }
}

/// Split on `separator` except inside double quotes
fn split_outside_quotes(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

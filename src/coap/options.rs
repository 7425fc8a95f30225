//! Content formats and response options

use std::fmt;

/// Content formats an LwM2M client may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFormat {
    Text,
    Link,
    Opaque,
    Tlv,
    Json,
}

impl ContentFormat {
    /// `application/link-format`
    pub const LINK_FORMAT_CODE: u16 = 40;

    /// Resolve a numeric content format
    ///
    /// Accepts the registered IANA numbers as well as the provisional
    /// 1541-1544 range used by LwM2M 1.0 drafts.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 | 1541 => Some(ContentFormat::Text),
            40 => Some(ContentFormat::Link),
            42 | 1544 => Some(ContentFormat::Opaque),
            11542 | 1542 => Some(ContentFormat::Tlv),
            11543 | 1543 => Some(ContentFormat::Json),
            _ => None,
        }
    }

    /// Registered IANA number
    pub fn code(self) -> u16 {
        match self {
            ContentFormat::Text => 0,
            ContentFormat::Link => Self::LINK_FORMAT_CODE,
            ContentFormat::Opaque => 42,
            ContentFormat::Tlv => 11542,
            ContentFormat::Json => 11543,
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ContentFormat::Text => "text/plain",
            ContentFormat::Link => "application/link-format",
            ContentFormat::Opaque => "application/octet-stream",
            ContentFormat::Tlv => "application/vnd.oma.lwm2m+tlv",
            ContentFormat::Json => "application/vnd.oma.lwm2m+json",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.media_type(), self.code())
    }
}

/// The subset of CoAP options the response translation reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseOptions {
    /// Content-Format option (raw number)
    pub content_format: Option<u16>,

    /// Observe option (sequence number)
    pub observe: Option<u32>,

    /// Location-Path option, one entry per segment
    pub location_path: Vec<String>,
}

impl ResponseOptions {
    /// True when the Observe option is present
    pub fn has_observe(&self) -> bool {
        self.observe.is_some()
    }

    /// Location-Path segments joined with `/`, or `None` if absent
    pub fn location_path_string(&self) -> Option<String> {
        if self.location_path.is_empty() {
            None
        } else {
            Some(self.location_path.join("/"))
        }
    }
}

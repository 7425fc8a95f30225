//! Request Module
//!
//! Downlink operations and their CoAP encoding.

mod downlink;
mod builder;

pub use downlink::{DownlinkRequest, NotificationAttributes, Payload, RequestKind, WriteMode};
pub use builder::build_request;

//! CoAP Module
//!
//! The transport-level view of a device conversation.
//!
//! ## Response Code Byte
//! ```text
//! ┌───────────┬─────────────────┐
//! │ Class (3) │   Detail (5)    │
//! └───────────┴─────────────────┘
//! ```
//!
//! ### Codes LwM2M responses may carry
//! - 0x41: 2.01 CREATED
//! - 0x42: 2.02 DELETED
//! - 0x44: 2.04 CHANGED
//! - 0x45: 2.05 CONTENT
//! - 0x80: 4.00 BAD_REQUEST
//! - 0x81: 4.01 UNAUTHORIZED
//! - 0x83: 4.03 FORBIDDEN
//! - 0x84: 4.04 NOT_FOUND
//! - 0x85: 4.05 METHOD_NOT_ALLOWED

mod code;
mod options;
mod message;
mod exchange;

pub use code::ResponseCode;
pub use options::{ContentFormat, ResponseOptions};
pub use message::{CoapRequest, CoapResponse, Method, Token};
pub use exchange::{Exchange, MessageObserver};

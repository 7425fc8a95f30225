//! # lwm2m-bridge
//!
//! Response translation for an LwM2M device-management server:
//! - CoAP status → LwM2M result code mapping
//! - Per-operation status classification (success / failure / violation)
//! - Content decoding (text, opaque, TLV, JSON, link-format)
//! - Observation registration bound to the observe exchange
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Session                              │
//! │           (build request, send, apply policy)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ (request, exchange, response)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Response Translator                         │
//! │         (status table per request kind, one outcome)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────────┐
//!          │            │                     │
//!          ▼            ▼                     ▼
//!   ┌─────────────┐ ┌─────────────┐   ┌──────────────┐
//!   │ Status Map  │ │   Decoder   │   │  Observation │
//!   │ (9 codes)   │ │ (TLV, JSON) │   │   Registry   │
//!   └─────────────┘ └─────────────┘   └──────┬───────┘
//!                                            │ Weak
//!                                            ▼
//!                                     ┌──────────────┐
//!                                     │   Exchange   │
//!                                     │ (observers)  │
//!                                     └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod node;
pub mod coap;
pub mod codec;
pub mod link;
pub mod client;
pub mod request;
pub mod response;
pub mod observe;
pub mod translate;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BridgeError, CodecError, Result};
pub use config::{Config, RegistrationFailurePolicy};
pub use client::Client;
pub use request::DownlinkRequest;
pub use response::{LwM2mResponse, ResultCode};
pub use translate::{ResponseTranslator, Translation};
pub use session::{Session, Transport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of lwm2m-bridge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

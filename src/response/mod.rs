//! Response Module
//!
//! Result codes and typed responses handed back to the session layer.
//!
//! ### Result Codes
//! - CREATED, DELETED, CHANGED, CONTENT (success)
//! - BAD_REQUEST, UNAUTHORIZED, FORBIDDEN, NOT_FOUND, METHOD_NOT_ALLOWED

mod status;
#[allow(clippy::module_inception)]
mod response;

pub use status::{map_status, ResultCode};
pub use response::LwM2mResponse;

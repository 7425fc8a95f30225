//! Observe Module
//!
//! Live observations and the registry that tracks them.
//!
//! ## Ownership
//! ```text
//!   ┌──────────────┐   Arc    ┌──────────────┐   Arc    ┌──────────────┐
//!   │   Registry   │ ───────▶ │ Observation  │ ◀─────── │   Exchange   │
//!   │ (by token)   │ ◀ ─ ─ ─  │              │  ─ ─ ─ ▶ │ (observers)  │
//!   └──────────────┘   Weak   └──────────────┘   Weak   └──────────────┘
//! ```
//!
//! Notifications delivered on the exchange reach the registry through the
//! observation; cancelling either side tears down the other once.

mod observation;
mod registry;
mod listener;

pub use observation::Observation;
pub use registry::{InMemoryObservationRegistry, ObservationRegistry};
pub use listener::{ChannelListener, ObservationEvent, ObservationListener};

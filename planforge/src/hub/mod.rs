//! Live update fan-out to connected observers.
//!
//! Observers subscribe for the duration of a session and receive task
//! lifecycle events plus heartbeats. Delivery is best effort: a slow or
//! disconnected observer is pruned at the next send, and broadcasting with
//! zero observers costs nothing.

mod broadcast;
mod event;

pub use broadcast::{HubConfig, Subscription, UpdateHub};
pub use event::{EventKind, UpdateEvent};

/// Wire path observers connect to for the update stream.
pub const UPDATES_PATH: &str = "/updates";

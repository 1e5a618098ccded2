//! The shared session record one pipeline pass owns exclusively.
//!
//! A [`SessionContext`] is created by the caller from a [`SessionSeed`],
//! handed to the coordinator as `&mut` for the duration of a pass, and
//! returned afterwards. Nothing in this module spawns work or talks to
//! providers; it is a data record with its invariants encoded in its API:
//! a set-once identity, an append-only history, and a closed attention map
//! whose slots are only ever replaced whole.

mod attention;
mod history;
mod session;
mod workflow;

pub use attention::{
    AttentionMap, AttentionPayload, DiscoveryAttention, Horizon, Objective, ObjectivesAttention,
    RoadmapAttention, RoadmapItem,
};
pub use history::{Exchange, HistoryLog};
pub use session::{SessionContext, SessionSeed};
pub use workflow::{StageName, WorkflowState};

//! Stage agents: one specialist per workflow stage.
//!
//! An agent reads the shared [`SessionContext`](crate::context::SessionContext),
//! calls its completion provider, and returns a [`StageReport`] carrying the
//! refreshed attention entry and the gate signal. Agents never mutate the
//! context themselves; the coordinator owns the merge.
//!
//! Confidence is expected to be monotonic in information: given strictly more
//! collaborator input, an agent should not report less confidence. The
//! production agents delegate that property to the provider prompt; scripted
//! test agents satisfy it by construction.

mod discovery;
mod objectives;
mod report;
mod roadmap;

pub use discovery::DiscoveryAgent;
pub use objectives::ObjectivesAgent;
pub use report::{MissingInfo, ResearchProposal, StageReport};
pub use roadmap::RoadmapAgent;

use crate::context::{SessionContext, StageName};
use crate::errors::AgentFault;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;

/// A stage specialist.
///
/// `evaluate` receives the context read-only plus the latest collaborator
/// message, and must return a report whose attention entry belongs to
/// [`Agent::stage`].
#[async_trait]
pub trait Agent: Send + Sync + fmt::Debug {
    /// The workflow stage this agent serves.
    fn stage(&self) -> StageName;

    /// Runs one evaluation pass over the context.
    async fn evaluate(
        &self,
        ctx: &SessionContext,
        input: Option<&str>,
    ) -> Result<StageReport, AgentFault>;
}

/// Decodes a provider reply into a stage's typed shape.
///
/// Malformed replies are transient: the provider may produce valid output on
/// the next attempt.
pub(crate) fn decode_reply<T: DeserializeOwned>(
    value: serde_json::Value,
    stage: StageName,
) -> Result<T, AgentFault> {
    serde_json::from_value(value)
        .map_err(|e| AgentFault::transient(format!("malformed {stage} reply: {e}")))
}

/// Renders the recent conversation for inclusion in a prompt.
pub(crate) fn transcript(ctx: &SessionContext, limit: usize) -> String {
    let mut lines = Vec::new();
    for exchange in ctx.history().recent(limit) {
        lines.push(format!("{}: {}", exchange.role, exchange.content));
    }
    lines.join("\n")
}

//! Outcome types returned by a coordinator pass.

use crate::agents::{MissingInfo, ResearchProposal};
use crate::context::StageName;
use serde::{Deserialize, Serialize};

/// Where a pass left the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PassStatus {
    /// Every stage met its gate; the roadmap is in the attention map.
    Complete,
    /// A stage held the pass, waiting for more collaborator input.
    NeedsInput {
        /// The stage that held the pass.
        stage: StageName,
        /// What it still needs.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        missing: Vec<MissingInfo>,
    },
    /// A stage used up its attempt bound without meeting its gate.
    Escalated {
        /// The stage that ran out of attempts.
        stage: StageName,
    },
}

impl PassStatus {
    /// Returns true when the whole workflow finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// A tolerated stage fault, recorded on the outcome instead of failing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFaultNote {
    /// The stage that faulted.
    pub stage: StageName,
    /// The fault description.
    pub reason: String,
}

/// Everything one pass produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassOutcome {
    /// Where the workflow stands after the pass.
    pub status: PassStatus,
    /// Research proposals the spawn policy approved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub approved: Vec<ResearchProposal>,
    /// How many proposals the policy rejected.
    pub rejected: usize,
    /// Faults tolerated along the way.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<StageFaultNote>,
    /// Wall-clock duration of the pass in milliseconds.
    pub duration_ms: f64,
}

//! Workflow progress: current stage, attempt counters, pass counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The fixed, ordered set of pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Understands the collaborator's situation and aspirations.
    Discovery,
    /// Distills aspirations into concrete objectives.
    Objectives,
    /// Lays out milestones across planning horizons.
    Roadmap,
}

impl StageName {
    /// All stages in execution order.
    pub const ALL: [Self; 3] = [Self::Discovery, Self::Objectives, Self::Roadmap];

    /// Returns the stage name as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Objectives => "objectives",
            Self::Roadmap => "roadmap",
        }
    }

    /// Returns the stage that follows this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Discovery => Some(Self::Objectives),
            Self::Objectives => Some(Self::Roadmap),
            Self::Roadmap => None,
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a session stands in the gated workflow.
///
/// The stage pointer only moves forward through [`advance_to`]; attempt
/// counters only grow. Timestamps are refreshed by the coordinator on every
/// merge.
///
/// [`advance_to`]: WorkflowState::advance_to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    stage: StageName,
    #[serde(default)]
    stage_attempts: HashMap<StageName, u32>,
    #[serde(default)]
    total_passes: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkflowState {
    /// Creates workflow state positioned at the first stage.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            stage: StageName::Discovery,
            stage_attempts: HashMap::new(),
            total_passes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The stage the next pass resumes at.
    #[must_use]
    pub fn stage(&self) -> StageName {
        self.stage
    }

    /// Moves the stage pointer.
    pub fn advance_to(&mut self, stage: StageName) {
        self.stage = stage;
        self.touch();
    }

    /// Number of gated re-entries recorded for a stage.
    #[must_use]
    pub fn attempts_for(&self, stage: StageName) -> u32 {
        self.stage_attempts.get(&stage).copied().unwrap_or(0)
    }

    /// Records a gated re-entry and returns the new count.
    pub fn record_attempt(&mut self, stage: StageName) -> u32 {
        let count = self.stage_attempts.entry(stage).or_insert(0);
        *count += 1;
        let count = *count;
        self.touch();
        count
    }

    /// Total passes run over this session.
    #[must_use]
    pub fn total_passes(&self) -> u64 {
        self.total_passes
    }

    /// Counts a new pass.
    pub fn record_pass(&mut self) {
        self.total_passes += 1;
        self.touch();
    }

    /// When the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the workflow last changed.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Refreshes the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(StageName::Discovery.next(), Some(StageName::Objectives));
        assert_eq!(StageName::Objectives.next(), Some(StageName::Roadmap));
        assert_eq!(StageName::Roadmap.next(), None);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(StageName::Discovery.to_string(), "discovery");
        assert_eq!(StageName::Roadmap.as_str(), "roadmap");
    }

    #[test]
    fn test_workflow_starts_at_discovery() {
        let workflow = WorkflowState::new();
        assert_eq!(workflow.stage(), StageName::Discovery);
        assert_eq!(workflow.total_passes(), 0);
        assert_eq!(workflow.attempts_for(StageName::Discovery), 0);
    }

    #[test]
    fn test_attempt_counter_accumulates_per_stage() {
        let mut workflow = WorkflowState::new();
        assert_eq!(workflow.record_attempt(StageName::Discovery), 1);
        assert_eq!(workflow.record_attempt(StageName::Discovery), 2);
        assert_eq!(workflow.record_attempt(StageName::Objectives), 1);
        assert_eq!(workflow.attempts_for(StageName::Discovery), 2);
    }

    #[test]
    fn test_advance_touches_updated_at() {
        let mut workflow = WorkflowState::new();
        let before = workflow.updated_at();
        workflow.advance_to(StageName::Objectives);
        assert_eq!(workflow.stage(), StageName::Objectives);
        assert!(workflow.updated_at() >= before);
    }

    #[test]
    fn test_workflow_serialization_round_trip() {
        let mut workflow = WorkflowState::new();
        workflow.record_attempt(StageName::Discovery);
        workflow.advance_to(StageName::Objectives);
        workflow.record_pass();

        let json = serde_json::to_string(&workflow).unwrap();
        let restored: WorkflowState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.stage(), StageName::Objectives);
        assert_eq!(restored.attempts_for(StageName::Discovery), 1);
        assert_eq!(restored.total_passes(), 1);
    }
}

//! Task records and their caller-facing views.

use crate::agents::ResearchProposal;
use crate::context::Horizon;
use crate::errors::ValidationError;
use crate::providers::ResearchFindings;
use crate::scheduler::ResearchTier;
use crate::utils::non_empty;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a caller submits to the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Dedup key; one live task per subject.
    pub subject_id: String,
    /// Opaque query for the research provider.
    pub query: String,
    /// Requested research depth.
    pub tier: ResearchTier,
    /// Horizon of the originating roadmap item.
    pub horizon: Horizon,
}

impl TaskRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        query: impl Into<String>,
        tier: ResearchTier,
        horizon: Horizon,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            query: query.into(),
            tier,
            horizon,
        }
    }

    /// Validates the request fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("subject_id", &self.subject_id)?;
        non_empty("query", &self.query)
    }
}

impl From<&ResearchProposal> for TaskRequest {
    fn from(proposal: &ResearchProposal) -> Self {
        Self {
            subject_id: proposal.subject_id.clone(),
            query: proposal.query.clone(),
            tier: proposal.tier,
            horizon: proposal.horizon,
        }
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Accepted, waiting for a worker.
    Pending,
    /// A worker is executing it.
    Running,
    /// Finished with findings.
    Complete,
    /// Finished with an error.
    Error,
}

impl TaskState {
    /// Returns true for states a task never leaves.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    /// Returns the state as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A background research task.
///
/// Ids are UUIDv7 so task listings sort by creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique id.
    pub id: Uuid,
    /// Subject the research concerns.
    pub subject_id: String,
    /// Query handed to the provider.
    pub query: String,
    /// Research depth.
    pub tier: ResearchTier,
    /// Horizon of the originating item.
    pub horizon: Horizon,
    /// Current lifecycle state.
    pub state: TaskState,
    /// When the task was accepted.
    pub created_at: DateTime<Utc>,
    /// When a worker picked it up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When it reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Findings, present once complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResearchFindings>,
    /// Error description, present once failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    /// Creates a pending task from a validated request.
    #[must_use]
    pub fn new(request: TaskRequest) -> Self {
        Self {
            id: Uuid::now_v7(),
            subject_id: request.subject_id,
            query: request.query,
            tier: request.tier,
            horizon: request.horizon,
            state: TaskState::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }

    /// The caller-facing view of this task.
    #[must_use]
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            task_id: self.id,
            subject_id: self.subject_id.clone(),
            state: self.state,
            result: self.result.clone(),
            error: self.error.clone(),
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}

/// Receipt returned when a task is accepted or deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReceipt {
    /// Id of the live task covering the subject.
    pub task_id: Uuid,
    /// Expectation-setting estimate for the task's tier.
    pub estimated_seconds: u64,
    /// True when an existing live task absorbed the request.
    pub deduplicated: bool,
}

/// Point-in-time view of a task for status queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    /// Task id.
    pub task_id: Uuid,
    /// Subject the research concerns.
    pub subject_id: String,
    /// Current state.
    pub state: TaskState,
    /// Findings, once complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResearchFindings>,
    /// Error description, once failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the task was accepted.
    pub created_at: DateTime<Utc>,
    /// When it reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let request = TaskRequest::new("item-1", "compare programs", ResearchTier::Base, Horizon::Tactical);
        assert!(request.validate().is_ok());

        let bad = TaskRequest::new("item-1", "   ", ResearchTier::Base, Horizon::Tactical);
        assert!(bad.validate().is_err());

        let bad = TaskRequest::new("", "query", ResearchTier::Base, Horizon::Tactical);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_request_from_proposal_keeps_tier() {
        let proposal = ResearchProposal::new("item-7", "Visa timeline", "visa steps", Horizon::Tactical)
            .with_tier(ResearchTier::Pro);
        let request = TaskRequest::from(&proposal);

        assert_eq!(request.subject_id, "item-7");
        assert_eq!(request.tier, ResearchTier::Pro);
        assert_eq!(request.horizon, Horizon::Tactical);
    }

    #[test]
    fn test_new_task_starts_pending() {
        let task = Task::new(TaskRequest::new(
            "item-1",
            "compare programs",
            ResearchTier::Base,
            Horizon::Tactical,
        ));

        assert_eq!(task.state, TaskState::Pending);
        assert!(task.started_at.is_none());
        assert!(task.completed_at.is_none());
        assert!(task.result.is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Running.is_terminal());
        assert!(TaskState::Complete.is_terminal());
        assert!(TaskState::Error.is_terminal());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let task = Task::new(TaskRequest::new(
            "item-1",
            "compare programs",
            ResearchTier::Base,
            Horizon::Tactical,
        ));
        let json = serde_json::to_value(task.snapshot()).unwrap();

        assert!(json.get("taskId").is_some());
        assert_eq!(json["subjectId"], "item-1");
        assert_eq!(json["state"], "pending");
        assert!(json.get("result").is_none());
    }
}

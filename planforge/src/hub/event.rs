//! Wire events pushed to connected observers.

use crate::providers::ResearchFindings;
use crate::scheduler::ResearchTier;
use crate::utils::iso_timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The kind tag of an update event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Subscription acknowledged; always the first event an observer sees.
    #[serde(rename = "connected")]
    Connected,
    /// Heartbeat.
    #[serde(rename = "ping")]
    Ping,
    /// A research task was accepted.
    #[serde(rename = "task.created")]
    TaskCreated,
    /// A worker picked the task up.
    #[serde(rename = "task.started")]
    TaskStarted,
    /// Progress note from a running task.
    #[serde(rename = "task.progress")]
    TaskProgress,
    /// The task finished with findings.
    #[serde(rename = "task.completed")]
    TaskCompleted,
    /// The task failed.
    #[serde(rename = "task.failed")]
    TaskFailed,
}

impl EventKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Ping => "ping",
            Self::TaskCreated => "task.created",
            Self::TaskStarted => "task.started",
            Self::TaskProgress => "task.progress",
            Self::TaskCompleted => "task.completed",
            Self::TaskFailed => "task.failed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event on the observer wire.
///
/// Field names serialize camelCase to match the wire format observers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Task the event concerns, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
    /// Subject of that task, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    /// ISO-8601 timestamp with microsecond precision.
    pub timestamp: String,
    /// Kind-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl UpdateEvent {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            task_id: None,
            subject_id: None,
            timestamp: iso_timestamp(),
            payload: None,
        }
    }

    /// The subscription acknowledgement.
    #[must_use]
    pub fn connected(observer_id: Uuid) -> Self {
        let mut event = Self::new(EventKind::Connected);
        event.payload = Some(serde_json::json!({ "observerId": observer_id }));
        event
    }

    /// A heartbeat ping.
    #[must_use]
    pub fn ping() -> Self {
        Self::new(EventKind::Ping)
    }

    /// A task acceptance notice with its expectation-setting estimate.
    #[must_use]
    pub fn task_created(task_id: Uuid, subject_id: impl Into<String>, tier: ResearchTier) -> Self {
        let mut event = Self::new(EventKind::TaskCreated);
        event.task_id = Some(task_id);
        event.subject_id = Some(subject_id.into());
        event.payload = Some(serde_json::json!({
            "tier": tier,
            "estimatedSeconds": tier.estimated_seconds(),
        }));
        event
    }

    /// A task pickup notice.
    #[must_use]
    pub fn task_started(task_id: Uuid, subject_id: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::TaskStarted);
        event.task_id = Some(task_id);
        event.subject_id = Some(subject_id.into());
        event
    }

    /// A progress note from a running task.
    #[must_use]
    pub fn task_progress(
        task_id: Uuid,
        subject_id: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        let mut event = Self::new(EventKind::TaskProgress);
        event.task_id = Some(task_id);
        event.subject_id = Some(subject_id.into());
        event.payload = Some(serde_json::json!({ "note": note.into() }));
        event
    }

    /// A completion notice carrying the findings.
    #[must_use]
    pub fn task_completed(
        task_id: Uuid,
        subject_id: impl Into<String>,
        findings: &ResearchFindings,
    ) -> Self {
        let mut event = Self::new(EventKind::TaskCompleted);
        event.task_id = Some(task_id);
        event.subject_id = Some(subject_id.into());
        event.payload = serde_json::to_value(findings).ok();
        event
    }

    /// A failure notice.
    #[must_use]
    pub fn task_failed(
        task_id: Uuid,
        subject_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut event = Self::new(EventKind::TaskFailed);
        event.task_id = Some(task_id);
        event.subject_id = Some(subject_id.into());
        event.payload = Some(serde_json::json!({ "error": message.into() }));
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_camel_case() {
        let event = UpdateEvent::task_started(Uuid::new_v4(), "item-1");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "task.started");
        assert!(json.get("taskId").is_some());
        assert_eq!(json["subjectId"], "item-1");
        assert!(json.get("task_id").is_none());
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn test_connected_carries_observer_id() {
        let observer_id = Uuid::new_v4();
        let event = UpdateEvent::connected(observer_id);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "connected");
        assert_eq!(json["payload"]["observerId"], observer_id.to_string());
    }

    #[test]
    fn test_task_created_carries_estimate() {
        let event = UpdateEvent::task_created(Uuid::new_v4(), "item-1", ResearchTier::Lite);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["payload"]["tier"], "lite");
        assert_eq!(json["payload"]["estimatedSeconds"], 30);
    }

    #[test]
    fn test_task_completed_embeds_findings() {
        let findings = ResearchFindings::new("three programs fit the constraints")
            .with_source("Program comparison", "https://example.org/programs");
        let event = UpdateEvent::task_completed(Uuid::new_v4(), "item-1", &findings);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["payload"]["summary"], "three programs fit the constraints");
        assert_eq!(json["payload"]["sources"][0]["title"], "Program comparison");
    }

    #[test]
    fn test_timestamp_is_populated() {
        let event = UpdateEvent::ping();
        assert!(event.timestamp.contains('T'));
        assert!(event.timestamp.ends_with("+00:00"));
    }
}

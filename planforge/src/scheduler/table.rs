//! In-memory task table with subject-level dedup.

use super::{Task, TaskState};
use crate::providers::ResearchFindings;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Outcome of registering a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The task was admitted under this id.
    Created(Uuid),
    /// A live task already covers the subject; its id is returned.
    Duplicate(Uuid),
}

/// Tasks keyed by id, plus a live-subject index enforcing dedup.
///
/// A subject is live while its task is pending or running; the index entry
/// is released on the terminal transition, never by the sweeper. Lock order
/// is always subject index first, then the task map.
#[derive(Debug, Default)]
pub struct TaskTable {
    tasks: DashMap<Uuid, Task>,
    live_subjects: Mutex<HashMap<String, Uuid>>,
}

impl TaskTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a task unless its subject already has a live one.
    pub fn register(&self, task: Task) -> RegisterOutcome {
        let mut subjects = self.live_subjects.lock();
        if let Some(existing) = subjects.get(&task.subject_id) {
            return RegisterOutcome::Duplicate(*existing);
        }
        let id = task.id;
        subjects.insert(task.subject_id.clone(), id);
        self.tasks.insert(id, task);
        RegisterOutcome::Created(id)
    }

    /// Returns a copy of the task, if present.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.get(&id).map(|entry| entry.clone())
    }

    /// Number of retained tasks, terminal ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true when no tasks are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Moves a pending task to running. Returns false for any other state.
    pub fn mark_running(&self, id: Uuid) -> bool {
        match self.tasks.get_mut(&id) {
            Some(mut task) if task.state == TaskState::Pending => {
                task.state = TaskState::Running;
                task.started_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Completes a task with findings. Returns false if it was already
    /// terminal or unknown.
    pub fn mark_complete(&self, id: Uuid, findings: ResearchFindings) -> bool {
        self.mark_terminal(id, TaskState::Complete, Some(findings), None)
    }

    /// Fails a task with an error description. Returns false if it was
    /// already terminal or unknown.
    pub fn mark_error(&self, id: Uuid, message: impl Into<String>) -> bool {
        self.mark_terminal(id, TaskState::Error, None, Some(message.into()))
    }

    fn mark_terminal(
        &self,
        id: Uuid,
        state: TaskState,
        result: Option<ResearchFindings>,
        error: Option<String>,
    ) -> bool {
        let mut subjects = self.live_subjects.lock();
        let Some(mut task) = self.tasks.get_mut(&id) else {
            return false;
        };
        if task.state.is_terminal() {
            return false;
        }

        task.state = state;
        task.completed_at = Some(Utc::now());
        task.result = result;
        task.error = error;

        if subjects.get(&task.subject_id) == Some(&id) {
            subjects.remove(&task.subject_id);
        }
        true
    }

    /// Removes terminal tasks whose completion is older than `retention`.
    ///
    /// Pending and running tasks are never swept regardless of age. Returns
    /// how many tasks were removed.
    pub fn sweep(&self, now: DateTime<Utc>, retention: Duration) -> usize {
        let expired: Vec<Uuid> = self
            .tasks
            .iter()
            .filter(|entry| {
                let task = entry.value();
                task.state.is_terminal()
                    && task.completed_at.is_some_and(|done| {
                        (now - done).to_std().is_ok_and(|age| age > retention)
                    })
            })
            .map(|entry| *entry.key())
            .collect();

        let mut removed = 0;
        for id in expired {
            if self.tasks.remove(&id).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "swept expired tasks");
        }
        removed
    }
}

//! The research scheduler: accepts tasks, runs them, reports status.

use super::{RegisterOutcome, Task, TaskReceipt, TaskRequest, TaskSnapshot, TaskTable};
use crate::agents::ResearchProposal;
use crate::errors::{SchedulerError, ValidationError};
use crate::hub::{UpdateEvent, UpdateHub};
use crate::providers::ResearchProvider;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Configuration for [`ResearchScheduler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    sweep_interval_secs: u64,
    retention_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 900,
            retention_secs: 3600,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default scheduler configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how often the sweeper runs, in seconds.
    #[must_use]
    pub fn with_sweep_interval_secs(mut self, secs: u64) -> Self {
        self.sweep_interval_secs = secs;
        self
    }

    /// Sets how long terminal tasks are retained, in seconds.
    #[must_use]
    pub fn with_retention_secs(mut self, secs: u64) -> Self {
        self.retention_secs = secs;
        self
    }

    /// The sweeper period.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// The terminal-task retention window.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::new("sweep_interval_secs", "must be at least 1"));
        }
        if self.retention_secs == 0 {
            return Err(ValidationError::new("retention_secs", "must be at least 1"));
        }
        Ok(())
    }
}

/// Runs research tasks in the background, decoupled from the pipeline.
///
/// Work arrives through [`ResearchScheduler::create_task`] from any caller.
/// One live task per subject is enforced; accepted tasks are handed to a
/// dispatcher over an unbounded queue and executed concurrently. Outcomes
/// are observable through [`ResearchScheduler::status`] and the update hub,
/// never by blocking the submitter.
pub struct ResearchScheduler {
    table: Arc<TaskTable>,
    provider: Arc<dyn ResearchProvider>,
    hub: Arc<UpdateHub>,
    config: SchedulerConfig,
    queue_tx: mpsc::UnboundedSender<Uuid>,
    queue_rx: Mutex<Option<mpsc::UnboundedReceiver<Uuid>>>,
    shutdown: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ResearchScheduler {
    /// Creates a scheduler. Nothing executes until [`ResearchScheduler::start`].
    pub fn new(
        provider: Arc<dyn ResearchProvider>,
        hub: Arc<UpdateHub>,
        config: SchedulerConfig,
    ) -> Result<Arc<Self>, ValidationError> {
        config.validate()?;
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (shutdown, _) = watch::channel(false);

        Ok(Arc::new(Self {
            table: Arc::new(TaskTable::new()),
            provider,
            hub,
            config,
            queue_tx,
            queue_rx: Mutex::new(Some(queue_rx)),
            shutdown,
            workers: Mutex::new(Vec::new()),
        }))
    }

    /// Starts the dispatcher and the sweeper. Calling it again is a no-op.
    pub fn start(self: &Arc<Self>) {
        let Some(mut queue_rx) = self.queue_rx.lock().take() else {
            return;
        };

        let table = Arc::clone(&self.table);
        let provider = Arc::clone(&self.provider);
        let hub = Arc::clone(&self.hub);
        let mut shutdown = self.shutdown.subscribe();
        let dispatcher = tokio::spawn(async move {
            let mut in_flight = JoinSet::new();
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    id = queue_rx.recv() => {
                        match id {
                            Some(id) => {
                                in_flight.spawn(execute(
                                    Arc::clone(&table),
                                    Arc::clone(&provider),
                                    Arc::clone(&hub),
                                    id,
                                ));
                            }
                            None => break,
                        }
                    }
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                }
            }
            // Let in-flight research land before the dispatcher exits.
            while in_flight.join_next().await.is_some() {}
            debug!("dispatcher stopped");
        });

        let table = Arc::clone(&self.table);
        let sweep_interval = self.config.sweep_interval();
        let retention = self.config.retention();
        let mut shutdown = self.shutdown.subscribe();
        let sweeper = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = table.sweep(Utc::now(), retention);
                        if removed > 0 {
                            info!(removed, "swept expired research tasks");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("sweeper stopped");
        });

        let mut workers = self.workers.lock();
        workers.push(dispatcher);
        workers.push(sweeper);
        info!(
            sweep_interval_secs = self.config.sweep_interval().as_secs(),
            retention_secs = self.config.retention().as_secs(),
            "research scheduler started"
        );
    }

    /// Accepts a research task, or returns the live task already covering
    /// the subject.
    ///
    /// Acceptance is immediate; execution happens in the background. The
    /// receipt carries the tier's expectation-setting time estimate.
    pub fn create_task(&self, request: TaskRequest) -> Result<TaskReceipt, SchedulerError> {
        request.validate()?;

        let task = Task::new(request);
        let subject_id = task.subject_id.clone();
        let tier = task.tier;

        match self.table.register(task) {
            RegisterOutcome::Duplicate(existing) => {
                let tier = self.table.get(existing).map_or(tier, |live| live.tier);
                debug!(
                    task_id = %existing,
                    subject_id = %subject_id,
                    "subject already has a live task"
                );
                Ok(TaskReceipt {
                    task_id: existing,
                    estimated_seconds: tier.estimated_seconds(),
                    deduplicated: true,
                })
            }
            RegisterOutcome::Created(id) => {
                if self.queue_tx.send(id).is_err() {
                    self.table.mark_error(id, "scheduler stopped");
                    return Err(SchedulerError::QueueClosed);
                }
                self.hub
                    .broadcast(&UpdateEvent::task_created(id, subject_id.as_str(), tier));
                info!(
                    task_id = %id,
                    subject_id = %subject_id,
                    tier = %tier,
                    "research task created"
                );
                Ok(TaskReceipt {
                    task_id: id,
                    estimated_seconds: tier.estimated_seconds(),
                    deduplicated: false,
                })
            }
        }
    }

    /// Submits every approved proposal from a pass, returning the receipts.
    pub fn submit_approved(
        &self,
        proposals: &[ResearchProposal],
    ) -> Result<Vec<TaskReceipt>, SchedulerError> {
        let mut receipts = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let receipt = self.create_task(TaskRequest::from(proposal))?;
            debug!(
                task_id = %receipt.task_id,
                subject_id = %proposal.subject_id,
                deduplicated = receipt.deduplicated,
                "proposal submitted"
            );
            receipts.push(receipt);
        }
        Ok(receipts)
    }

    /// Point-in-time view of a task, or None if never seen or swept.
    #[must_use]
    pub fn status(&self, task_id: Uuid) -> Option<TaskSnapshot> {
        self.table.get(task_id).map(|task| task.snapshot())
    }

    /// Number of retained tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.table.len()
    }

    /// Stops the dispatcher and sweeper, waiting for in-flight research to
    /// land. Tasks still queued but not dispatched stay pending.
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        let _ = futures::future::join_all(handles).await;
        debug!("research scheduler stopped");
    }
}

/// Runs one task to a terminal state, broadcasting its lifecycle.
///
/// The terminal transition is the gate: whichever call moves the task to
/// complete or error broadcasts the matching event, so observers see at
/// most one per task.
async fn execute(
    table: Arc<TaskTable>,
    provider: Arc<dyn ResearchProvider>,
    hub: Arc<UpdateHub>,
    task_id: Uuid,
) {
    let Some(task) = table.get(task_id) else {
        warn!(task_id = %task_id, "queued task vanished before execution");
        return;
    };

    if !table.mark_running(task_id) {
        warn!(task_id = %task_id, state = %task.state, "task not pending, skipping");
        return;
    }

    hub.broadcast(&UpdateEvent::task_started(task_id, task.subject_id.as_str()));
    debug!(
        task_id = %task_id,
        subject_id = %task.subject_id,
        tier = %task.tier,
        "research task started"
    );

    hub.broadcast(&UpdateEvent::task_progress(
        task_id,
        task.subject_id.as_str(),
        "querying research provider",
    ));

    match provider.run(&task.query, task.tier).await {
        Ok(findings) => {
            if table.mark_complete(task_id, findings.clone()) {
                hub.broadcast(&UpdateEvent::task_completed(
                    task_id,
                    task.subject_id.as_str(),
                    &findings,
                ));
                info!(task_id = %task_id, subject_id = %task.subject_id, "research task completed");
            }
        }
        Err(fault) => {
            let message = fault.to_string();
            if table.mark_error(task_id, message.as_str()) {
                hub.broadcast(&UpdateEvent::task_failed(
                    task_id,
                    task.subject_id.as_str(),
                    message.as_str(),
                ));
                warn!(
                    task_id = %task_id,
                    subject_id = %task.subject_id,
                    error = %fault,
                    "research task failed"
                );
            }
        }
    }
}

//! Background research scheduling, decoupled from the pipeline.
//!
//! This module provides:
//! - Tiered research depths with expectation-setting estimates
//! - A task table with one-live-task-per-subject dedup
//! - The scheduler: accept, dispatch, sweep, report

mod runtime;
mod table;
mod task;
mod tier;

pub use runtime::{ResearchScheduler, SchedulerConfig};
pub use table::{RegisterOutcome, TaskTable};
pub use task::{Task, TaskReceipt, TaskRequest, TaskSnapshot, TaskState};
pub use tier::ResearchTier;

//! Pass orchestration over the shared session context.
//!
//! This module provides:
//! - Gate configuration with per-stage thresholds and fault policies
//! - Retry with backoff and jitter for transient stage faults
//! - The coordinator that drives the agent chain through one pass

mod coordinator;
mod gate;
mod outcome;
mod retry;
#[cfg(test)]
mod scenario_tests;

pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use gate::{FaultPolicy, GateConfig};
pub use outcome::{PassOutcome, PassStatus, StageFaultNote};
pub use retry::{
    should_retry, with_retry, BackoffStrategy, JitterStrategy, RetryConfig, RetryDecision,
    RetryState,
};

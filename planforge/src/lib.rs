//! # Planforge
//!
//! A confidence-gated planning pipeline with tiered background research.
//!
//! Planforge turns an open-ended planning conversation into a structured
//! plan in three stages, with support for:
//!
//! - **Confidence gating**: each stage advances only when its specialist is
//!   ready and confident enough
//! - **Shared context**: one session context owns the conversation, the
//!   per-stage attention map, and workflow progress
//! - **Background research**: roadmap items can spawn tiered research tasks
//!   without ever blocking a pass
//! - **Live updates**: connected observers follow task lifecycles over a
//!   best-effort broadcast hub
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use planforge::prelude::*;
//!
//! // Wire the three stage agents over a completion provider
//! let coordinator = Coordinator::builder()
//!     .agent(Arc::new(DiscoveryAgent::new(provider.clone())))
//!     .agent(Arc::new(ObjectivesAgent::new(provider.clone())))
//!     .agent(Arc::new(RoadmapAgent::new(provider)))
//!     .build()?;
//!
//! // Run passes until the plan is complete
//! let mut ctx = SessionContext::new(SessionSeed::new("help me plan a career change"));
//! let outcome = coordinator.run_pass(&mut ctx, None).await?;
//!
//! // Hand approved research to the scheduler
//! scheduler.submit_approved(&outcome.approved)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod agents;
pub mod context;
pub mod errors;
pub mod hub;
pub mod pipeline;
pub mod policy;
pub mod providers;
pub mod scheduler;
pub mod telemetry;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agents::{
        Agent, DiscoveryAgent, MissingInfo, ObjectivesAgent, ResearchProposal, RoadmapAgent,
        StageReport,
    };
    pub use crate::context::{
        AttentionMap, AttentionPayload, Horizon, SessionContext, SessionSeed, StageName,
        WorkflowState,
    };
    pub use crate::errors::{
        AgentFault, CallerReport, PipelineError, ProviderFault, SchedulerError, StoreError,
        ValidationError,
    };
    pub use crate::hub::{HubConfig, Subscription, UpdateEvent, UpdateHub, UPDATES_PATH};
    pub use crate::pipeline::{
        Coordinator, CoordinatorBuilder, FaultPolicy, GateConfig, PassOutcome, PassStatus,
        RetryConfig,
    };
    pub use crate::policy::{PolicyConfig, SpawnPolicy};
    pub use crate::providers::{
        CompletionProvider, ContextStore, MemoryContextStore, ResearchFindings, ResearchProvider,
        StructuredCompletion,
    };
    pub use crate::scheduler::{
        ResearchScheduler, ResearchTier, SchedulerConfig, TaskReceipt, TaskRequest, TaskSnapshot,
        TaskState,
    };
    pub use crate::utils::{iso_timestamp, Timestamp};
}

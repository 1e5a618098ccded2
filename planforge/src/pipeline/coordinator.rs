//! The coordinator: drives stage agents over one pass of the workflow.
//!
//! A pass starts at the context's current stage and walks forward while each
//! stage meets its gate. The coordinator owns the merge: agents read the
//! context, the coordinator applies their attention entries and collects
//! their research proposals, then filters the proposals through the spawn
//! policy. It never talks to the scheduler; the caller forwards approved
//! proposals.

use super::{with_retry, FaultPolicy, GateConfig, PassOutcome, PassStatus, RetryConfig, StageFaultNote};
use crate::agents::{Agent, ResearchProposal};
use crate::context::{Exchange, SessionContext, StageName};
use crate::errors::{PipelineError, ValidationError};
use crate::policy::SpawnPolicy;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Orchestrates stage agents over a shared session context.
#[derive(Debug)]
pub struct Coordinator {
    agents: Vec<Arc<dyn Agent>>,
    policy: SpawnPolicy,
    gate: GateConfig,
    retry: RetryConfig,
}

/// Builder for [`Coordinator`].
#[derive(Debug, Default)]
pub struct CoordinatorBuilder {
    agents: Vec<Arc<dyn Agent>>,
    policy: Option<SpawnPolicy>,
    gate: GateConfig,
    retry: RetryConfig,
}

impl CoordinatorBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the next stage agent. Agents must be added in workflow
    /// order, starting at discovery.
    #[must_use]
    pub fn agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Sets the spawn policy.
    #[must_use]
    pub fn policy(mut self, policy: SpawnPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the gate configuration.
    #[must_use]
    pub fn gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }

    /// Sets the retry configuration for stage evaluations.
    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validates the agent chain and builds the coordinator.
    pub fn build(self) -> Result<Coordinator, ValidationError> {
        if self.agents.is_empty() {
            return Err(ValidationError::new("agents", "at least one agent is required"));
        }

        let mut expected = Some(StageName::Discovery);
        for agent in &self.agents {
            match expected {
                Some(stage) if agent.stage() == stage => expected = stage.next(),
                _ => {
                    return Err(ValidationError::new(
                        "agents",
                        format!(
                            "agents must follow workflow order from discovery; unexpected {}",
                            agent.stage()
                        ),
                    ))
                }
            }
        }
        if let Some(stage) = expected {
            return Err(ValidationError::new(
                "agents",
                format!("missing agent for stage {stage}"),
            ));
        }

        self.gate.validate()?;

        Ok(Coordinator {
            agents: self.agents,
            policy: self.policy.unwrap_or_default(),
            gate: self.gate,
            retry: self.retry,
        })
    }
}

impl Coordinator {
    /// Starts building a coordinator.
    #[must_use]
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    /// Number of registered stage agents.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.agents.len()
    }

    /// The gate configuration in effect.
    #[must_use]
    pub fn gate(&self) -> &GateConfig {
        &self.gate
    }

    /// Runs one pass over the context.
    ///
    /// The pass starts at the context's current stage and walks forward while
    /// gates are met. On a completed context it re-runs the final stage,
    /// refining the roadmap with whatever new input arrived.
    pub async fn run_pass(
        &self,
        ctx: &mut SessionContext,
        input: Option<&str>,
    ) -> Result<PassOutcome, PipelineError> {
        let start = Instant::now();

        ctx.workflow_mut().record_pass();
        if let Some(message) = input {
            ctx.history_mut().append(Exchange::user(message));
        }

        let current = ctx.workflow().stage();
        let start_index = self
            .agents
            .iter()
            .position(|agent| agent.stage() == current)
            .ok_or_else(|| {
                ValidationError::new("stage", format!("no agent registered for stage {current}"))
            })?;

        let mut proposals: Vec<ResearchProposal> = Vec::new();
        let mut faults: Vec<StageFaultNote> = Vec::new();
        let mut status = PassStatus::Complete;

        for agent in &self.agents[start_index..] {
            let stage = agent.stage();
            let threshold = self.gate.threshold(stage);

            let snapshot: &SessionContext = ctx;
            let result =
                with_retry(&self.retry, stage.as_str(), || agent.evaluate(snapshot, input)).await;

            let report = match result {
                Ok(report) => report,
                Err(fault) => match self.gate.fault_policy(stage) {
                    FaultPolicy::Abort => {
                        warn!(stage = %stage, error = %fault, "stage faulted, aborting pass");
                        return Err(PipelineError::StageFailed { stage, fault });
                    }
                    FaultPolicy::Tolerate => {
                        warn!(stage = %stage, error = %fault, "stage faulted, tolerated");
                        faults.push(StageFaultNote {
                            stage,
                            reason: fault.to_string(),
                        });
                        ctx.workflow_mut().record_attempt(stage);
                        status = PassStatus::NeedsInput {
                            stage,
                            missing: Vec::new(),
                        };
                        break;
                    }
                },
            };

            report.validate()?;
            if report.attention.stage() != stage {
                return Err(ValidationError::new(
                    "attention",
                    format!(
                        "agent for {stage} returned attention for {}",
                        report.attention.stage()
                    ),
                )
                .into());
            }

            // Merge before gating: partial understanding is kept even when
            // the stage holds the pass.
            ctx.attention_mut().apply(report.attention.clone());
            ctx.workflow_mut().touch();
            proposals.extend(report.proposals.iter().cloned());

            let gate_met = report.ready && report.confidence >= threshold;
            debug!(
                stage = %stage,
                ready = report.ready,
                confidence = report.confidence,
                threshold,
                gate_met,
                "stage evaluated"
            );

            if gate_met {
                if let Some(next) = stage.next() {
                    ctx.workflow_mut().advance_to(next);
                }
            } else {
                let attempts = ctx.workflow_mut().record_attempt(stage);
                status = if attempts > self.gate.max_stage_attempts() {
                    warn!(stage = %stage, attempts, "stage exceeded its attempt bound");
                    PassStatus::Escalated { stage }
                } else {
                    PassStatus::NeedsInput {
                        stage,
                        missing: report.missing.clone(),
                    }
                };
                break;
            }
        }

        let (approved, rejected) = self.policy.filter(proposals);
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            stage = %ctx.workflow().stage(),
            complete = status.is_complete(),
            approved = approved.len(),
            rejected,
            duration_ms,
            "pass finished"
        );

        Ok(PassOutcome {
            status,
            approved,
            rejected,
            faults,
            duration_ms,
        })
    }
}

//! Gate configuration: per-stage thresholds, attempt bounds, fault policies.

use crate::context::StageName;
use crate::errors::ValidationError;
use crate::utils::ensure_unit_range;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fallback threshold for stages without an explicit entry.
const FALLBACK_THRESHOLD: f64 = 0.8;

/// What the coordinator does when a stage still faults after retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Fail the whole pass with the stage fault.
    #[default]
    Abort,
    /// Record the fault and end the pass waiting for another attempt.
    Tolerate,
}

/// Confidence gate settings for a pipeline.
///
/// A stage advances only when its report is ready and its confidence meets
/// the stage's threshold. Attempts at a stage are bounded; beyond the bound
/// the pass escalates instead of asking for more input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    thresholds: HashMap<StageName, f64>,
    max_stage_attempts: u32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    fault_policies: HashMap<StageName, FaultPolicy>,
}

impl Default for GateConfig {
    fn default() -> Self {
        let mut thresholds = HashMap::new();
        thresholds.insert(StageName::Discovery, 0.9);
        thresholds.insert(StageName::Objectives, 0.9);
        thresholds.insert(StageName::Roadmap, 0.8);
        Self {
            thresholds,
            max_stage_attempts: 3,
            fault_policies: HashMap::new(),
        }
    }
}

impl GateConfig {
    /// Creates the default gate configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the threshold for one stage.
    #[must_use]
    pub fn with_threshold(mut self, stage: StageName, threshold: f64) -> Self {
        self.thresholds.insert(stage, threshold);
        self
    }

    /// Sets the per-stage attempt bound.
    #[must_use]
    pub fn with_max_stage_attempts(mut self, attempts: u32) -> Self {
        self.max_stage_attempts = attempts;
        self
    }

    /// Overrides the fault policy for one stage.
    #[must_use]
    pub fn with_fault_policy(mut self, stage: StageName, policy: FaultPolicy) -> Self {
        self.fault_policies.insert(stage, policy);
        self
    }

    /// The confidence threshold for a stage.
    #[must_use]
    pub fn threshold(&self, stage: StageName) -> f64 {
        self.thresholds
            .get(&stage)
            .copied()
            .unwrap_or(FALLBACK_THRESHOLD)
    }

    /// The per-stage attempt bound.
    #[must_use]
    pub fn max_stage_attempts(&self) -> u32 {
        self.max_stage_attempts
    }

    /// The fault policy for a stage, `Abort` unless overridden.
    #[must_use]
    pub fn fault_policy(&self, stage: StageName) -> FaultPolicy {
        self.fault_policies.get(&stage).copied().unwrap_or_default()
    }

    /// Validates thresholds and bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (stage, threshold) in &self.thresholds {
            ensure_unit_range(stage.as_str(), *threshold)?;
        }
        if self.max_stage_attempts == 0 {
            return Err(ValidationError::new(
                "max_stage_attempts",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

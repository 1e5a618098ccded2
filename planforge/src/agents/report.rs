//! Stage reports: the gate signal every agent returns.

use crate::context::{AttentionPayload, Horizon};
use crate::errors::ValidationError;
use crate::scheduler::ResearchTier;
use crate::utils::ensure_unit_range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories of information a stage still needs from the collaborator.
///
/// Meaningful only on reports with `ready == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInfo {
    /// Where the collaborator stands today.
    CurrentSituation,
    /// What they are trying to reach.
    DesiredOutcome,
    /// Over what period.
    Timeframe,
    /// What matters most among competing aims.
    Priorities,
    /// Limits the plan must respect.
    Constraints,
    /// How they will know it worked.
    SuccessCriteria,
}

impl MissingInfo {
    /// Returns the category as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentSituation => "current_situation",
            Self::DesiredOutcome => "desired_outcome",
            Self::Timeframe => "timeframe",
            Self::Priorities => "priorities",
            Self::Constraints => "constraints",
            Self::SuccessCriteria => "success_criteria",
        }
    }
}

impl fmt::Display for MissingInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A background research work item proposed by a stage.
///
/// Proposals are inert until the spawn policy approves them and the caller
/// forwards them to the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchProposal {
    /// The roadmap item the research concerns; the scheduler's dedup key.
    pub subject_id: String,
    /// Title the spawn policy matches against.
    pub title: String,
    /// Opaque query for the research provider.
    pub query: String,
    /// Horizon of the originating item.
    pub horizon: Horizon,
    /// Suggested research depth.
    pub tier: ResearchTier,
}

impl ResearchProposal {
    /// Creates a proposal at the default tier.
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        title: impl Into<String>,
        query: impl Into<String>,
        horizon: Horizon,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            title: title.into(),
            query: query.into(),
            horizon,
            tier: ResearchTier::default(),
        }
    }

    /// Sets the suggested tier.
    #[must_use]
    pub fn with_tier(mut self, tier: ResearchTier) -> Self {
        self.tier = tier;
        self
    }
}

/// What one stage invocation produced.
///
/// A report is a complete statement: the refreshed attention entry, the
/// gate signal (`ready` plus `confidence`), what is still missing, and any
/// research the stage wants done in the background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// Whether the stage considers its portion complete.
    pub ready: bool,
    /// Self-assessed confidence in `[0, 1]`.
    pub confidence: f64,
    /// What is still needed when not ready.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingInfo>,
    /// The refreshed attention entry for this stage.
    pub attention: AttentionPayload,
    /// Background research the stage proposes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proposals: Vec<ResearchProposal>,
}

impl StageReport {
    /// Creates a ready report.
    #[must_use]
    pub fn ready(confidence: f64, attention: AttentionPayload) -> Self {
        Self {
            ready: true,
            confidence,
            missing: Vec::new(),
            attention,
            proposals: Vec::new(),
        }
    }

    /// Creates a not-ready report naming what is missing.
    #[must_use]
    pub fn needs_input(
        confidence: f64,
        missing: Vec<MissingInfo>,
        attention: AttentionPayload,
    ) -> Self {
        Self {
            ready: false,
            confidence,
            missing,
            attention,
            proposals: Vec::new(),
        }
    }

    /// Attaches research proposals.
    #[must_use]
    pub fn with_proposals(mut self, proposals: Vec<ResearchProposal>) -> Self {
        self.proposals = proposals;
        self
    }

    /// Validates the report's numeric invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_unit_range("confidence", self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DiscoveryAttention;

    fn attention() -> AttentionPayload {
        AttentionPayload::Discovery(DiscoveryAttention::default())
    }

    #[test]
    fn test_ready_report_has_no_missing() {
        let report = StageReport::ready(0.95, attention());
        assert!(report.ready);
        assert!(report.missing.is_empty());
        assert!(report.validate().is_ok());
    }

    #[test]
    fn test_needs_input_carries_categories() {
        let report = StageReport::needs_input(
            0.4,
            vec![MissingInfo::Timeframe, MissingInfo::Constraints],
            attention(),
        );
        assert!(!report.ready);
        assert_eq!(report.missing.len(), 2);
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        let report = StageReport::ready(1.2, attention());
        assert!(report.validate().is_err());

        let report = StageReport::ready(f64::NAN, attention());
        assert!(report.validate().is_err());
    }

    #[test]
    fn test_missing_info_serializes_snake_case() {
        let json = serde_json::to_value(MissingInfo::SuccessCriteria).unwrap();
        assert_eq!(json, serde_json::json!("success_criteria"));
    }

    #[test]
    fn test_proposal_defaults_to_base_tier() {
        let proposal = ResearchProposal::new(
            "item-1",
            "University Research Plan",
            "compare admission requirements",
            Horizon::Tactical,
        );
        assert_eq!(proposal.tier, ResearchTier::Base);

        let deeper = proposal.with_tier(ResearchTier::Core);
        assert_eq!(deeper.tier, ResearchTier::Core);
    }
}

//! Ready-made contexts, reports, and proposals.

use crate::agents::{MissingInfo, ResearchProposal, StageReport};
use crate::context::{
    AttentionPayload, DiscoveryAttention, Horizon, Objective, ObjectivesAttention, RoadmapAttention,
    RoadmapItem, SessionContext, SessionSeed, StageName,
};

/// A seed with a representative opening message.
#[must_use]
pub fn seed() -> SessionSeed {
    SessionSeed::new("I want a plan for getting into climate research")
}

/// A fresh session context built from [`seed`].
#[must_use]
pub fn context() -> SessionContext {
    SessionContext::new(seed())
}

/// A plausible attention entry for the given stage.
#[must_use]
pub fn attention_for(stage: StageName) -> AttentionPayload {
    match stage {
        StageName::Discovery => AttentionPayload::Discovery(DiscoveryAttention {
            situation: "final-year physics student weighing graduate programs".into(),
            aspirations: vec!["work in climate research".into()],
            constraints: vec!["must stay within commuting distance of family".into()],
            open_threads: vec![],
        }),
        StageName::Objectives => AttentionPayload::Objectives(ObjectivesAttention {
            objectives: vec![Objective {
                title: "Secure a research internship".into(),
                outcome: "an offer in hand before spring".into(),
                horizon: Horizon::Tactical,
            }],
            guiding_theme: Some("move toward climate research".into()),
        }),
        StageName::Roadmap => AttentionPayload::Roadmap(RoadmapAttention {
            items: vec![RoadmapItem {
                id: "item-1".into(),
                title: "University Research Plan".into(),
                summary: "shortlist programs and their requirements".into(),
                horizon: Horizon::Tactical,
                research_query: None,
            }],
        }),
    }
}

/// A report that meets the gate at the given confidence.
#[must_use]
pub fn ready_report(stage: StageName, confidence: f64) -> StageReport {
    StageReport::ready(confidence, attention_for(stage))
}

/// A report that holds the pass, naming what is missing.
#[must_use]
pub fn gated_report(stage: StageName, confidence: f64, missing: Vec<MissingInfo>) -> StageReport {
    StageReport::needs_input(confidence, missing, attention_for(stage))
}

/// A research proposal with a fixed query at the default tier.
#[must_use]
pub fn proposal(subject_id: &str, title: &str, horizon: Horizon) -> ResearchProposal {
    ResearchProposal::new(subject_id, title, "gather background on the item", horizon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attention_matches_stage() {
        for stage in StageName::ALL {
            assert_eq!(attention_for(stage).stage(), stage);
        }
    }

    #[test]
    fn test_reports_validate() {
        assert!(ready_report(StageName::Discovery, 0.9).validate().is_ok());
        assert!(gated_report(StageName::Roadmap, 0.4, vec![MissingInfo::Priorities])
            .validate()
            .is_ok());
    }
}

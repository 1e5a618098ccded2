//! The attention map: one typed slot per stage, replaced whole.

use super::workflow::StageName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planning horizon of an objective or roadmap item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// Long-range direction, years out.
    Strategic,
    /// Mid-range moves, months out.
    Tactical,
    /// Near-term actions, days to weeks out.
    Execution,
}

impl Horizon {
    /// Returns the horizon as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strategic => "strategic",
            Self::Tactical => "tactical",
            Self::Execution => "execution",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the discovery stage learned about the collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryAttention {
    /// Current situation in the collaborator's own terms.
    pub situation: String,
    /// What they want to move toward.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aspirations: Vec<String>,
    /// Hard limits to plan around.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    /// Threads worth revisiting in a later exchange.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub open_threads: Vec<String>,
}

/// A single distilled objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Short name for the objective.
    pub title: String,
    /// What achieving it looks like.
    pub outcome: String,
    /// The horizon it belongs to.
    pub horizon: Horizon,
}

/// What the objectives stage distilled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectivesAttention {
    /// The objectives, most important first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<Objective>,
    /// A theme tying the objectives together, if one emerged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guiding_theme: Option<String>,
}

/// One milestone on the roadmap.
///
/// The `id` doubles as the subject identifier for any background research
/// spawned for this item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapItem {
    /// Stable identifier, unique within the roadmap.
    pub id: String,
    /// Short milestone name.
    pub title: String,
    /// What the milestone covers.
    pub summary: String,
    /// The horizon it belongs to.
    pub horizon: Horizon,
    /// A research question worth investigating in the background, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_query: Option<String>,
}

/// What the roadmap stage laid out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadmapAttention {
    /// Milestones in suggested order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<RoadmapItem>,
}

/// A stage's attention entry, tagged with the stage that owns it.
///
/// The tag makes cross-writes unrepresentable: a payload can only ever land
/// in the slot of the stage named inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum AttentionPayload {
    /// Entry owned by the discovery stage.
    Discovery(DiscoveryAttention),
    /// Entry owned by the objectives stage.
    Objectives(ObjectivesAttention),
    /// Entry owned by the roadmap stage.
    Roadmap(RoadmapAttention),
}

impl AttentionPayload {
    /// The stage that owns this payload.
    #[must_use]
    pub fn stage(&self) -> StageName {
        match self {
            Self::Discovery(_) => StageName::Discovery,
            Self::Objectives(_) => StageName::Objectives,
            Self::Roadmap(_) => StageName::Roadmap,
        }
    }
}

/// The closed attention map: one optional slot per stage.
///
/// A later pass through a stage replaces only that stage's slot; the other
/// slots are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttentionMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    discovery: Option<DiscoveryAttention>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objectives: Option<ObjectivesAttention>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roadmap: Option<RoadmapAttention>,
}

impl AttentionMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the slot owned by the payload's stage.
    pub fn apply(&mut self, payload: AttentionPayload) {
        match payload {
            AttentionPayload::Discovery(entry) => self.discovery = Some(entry),
            AttentionPayload::Objectives(entry) => self.objectives = Some(entry),
            AttentionPayload::Roadmap(entry) => self.roadmap = Some(entry),
        }
    }

    /// The discovery entry, if that stage has run.
    #[must_use]
    pub fn discovery(&self) -> Option<&DiscoveryAttention> {
        self.discovery.as_ref()
    }

    /// The objectives entry, if that stage has run.
    #[must_use]
    pub fn objectives(&self) -> Option<&ObjectivesAttention> {
        self.objectives.as_ref()
    }

    /// The roadmap entry, if that stage has run.
    #[must_use]
    pub fn roadmap(&self) -> Option<&RoadmapAttention> {
        self.roadmap.as_ref()
    }

    /// Returns true if the given stage has written its entry.
    #[must_use]
    pub fn contains(&self, stage: StageName) -> bool {
        match stage {
            StageName::Discovery => self.discovery.is_some(),
            StageName::Objectives => self.objectives.is_some(),
            StageName::Roadmap => self.roadmap.is_some(),
        }
    }

    /// The stages that have written entries, in stage order.
    #[must_use]
    pub fn stages(&self) -> Vec<StageName> {
        StageName::ALL
            .into_iter()
            .filter(|stage| self.contains(*stage))
            .collect()
    }

    /// Returns true if no stage has written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.discovery.is_none() && self.objectives.is_none() && self.roadmap.is_none()
    }
}

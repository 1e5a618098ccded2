//! Roadmap stage: sequence objectives into actionable items and propose
//! background research for the ones that merit it.

use super::{decode_reply, transcript, Agent, MissingInfo, ResearchProposal, StageReport};
use crate::context::{AttentionPayload, Horizon, RoadmapAttention, SessionContext, StageName};
use crate::errors::AgentFault;
use crate::providers::CompletionProvider;
use crate::scheduler::ResearchTier;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const TRANSCRIPT_WINDOW: usize = 8;

/// Provider-backed agent for the roadmap stage.
pub struct RoadmapAgent {
    provider: Arc<dyn CompletionProvider>,
}

#[derive(Debug, Deserialize)]
struct RoadmapReply {
    ready: bool,
    confidence: f64,
    #[serde(default)]
    missing: Vec<MissingInfo>,
    attention: RoadmapAttention,
}

/// Research depth suggested for an item at the given horizon.
fn tier_for(horizon: Horizon) -> ResearchTier {
    match horizon {
        Horizon::Strategic => ResearchTier::Core,
        Horizon::Tactical => ResearchTier::Base,
        Horizon::Execution => ResearchTier::Lite,
    }
}

impl RoadmapAgent {
    /// Creates a roadmap agent over the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    fn prompt(&self, ctx: &SessionContext, input: Option<&str>) -> String {
        let mut prompt = String::from(
            "You are the roadmap specialist in a collaborative planning session. \
             Sequence the agreed objectives into roadmap items, each with a stable \
             id, title, summary, and horizon. Where outside information would \
             materially improve an item, include a research_query describing what \
             to look up. Report readiness, confidence, and missing categories.\n\n",
        );
        if let Some(objectives) = ctx.attention().objectives() {
            if let Ok(json) = serde_json::to_string(objectives) {
                prompt.push_str("Objectives:\n");
                prompt.push_str(&json);
                prompt.push_str("\n\n");
            }
        }
        if let Some(prior) = ctx.attention().roadmap() {
            if let Ok(json) = serde_json::to_string(prior) {
                prompt.push_str("Prior roadmap:\n");
                prompt.push_str(&json);
                prompt.push_str("\n\n");
            }
        }
        prompt.push_str("Recent conversation:\n");
        prompt.push_str(&transcript(ctx, TRANSCRIPT_WINDOW));
        if let Some(message) = input {
            prompt.push_str("\n\nLatest message:\n");
            prompt.push_str(message);
        }
        prompt
    }

    fn reply_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "required": ["ready", "confidence", "attention"],
            "properties": {
                "ready": { "type": "boolean" },
                "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                "missing": {
                    "type": "array",
                    "items": {
                        "enum": [
                            "current_situation",
                            "desired_outcome",
                            "timeframe",
                            "priorities",
                            "constraints",
                            "success_criteria"
                        ]
                    }
                },
                "attention": {
                    "type": "object",
                    "required": ["items"],
                    "properties": {
                        "items": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["id", "title", "summary", "horizon"],
                                "properties": {
                                    "id": { "type": "string" },
                                    "title": { "type": "string" },
                                    "summary": { "type": "string" },
                                    "horizon": {
                                        "enum": ["strategic", "tactical", "execution"]
                                    },
                                    "research_query": { "type": "string" }
                                }
                            }
                        }
                    }
                }
            }
        })
    }
}

impl fmt::Debug for RoadmapAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoadmapAgent").finish_non_exhaustive()
    }
}

#[async_trait]
impl Agent for RoadmapAgent {
    fn stage(&self) -> StageName {
        StageName::Roadmap
    }

    async fn evaluate(
        &self,
        ctx: &SessionContext,
        input: Option<&str>,
    ) -> Result<StageReport, AgentFault> {
        let prompt = self.prompt(ctx, input);
        let schema = Self::reply_schema();
        let completion = self.provider.complete(&prompt, &schema).await?;
        let reply: RoadmapReply = decode_reply(completion.value, StageName::Roadmap)?;

        let proposals: Vec<ResearchProposal> = reply
            .attention
            .items
            .iter()
            .filter_map(|item| {
                item.research_query.as_ref().map(|query| {
                    ResearchProposal::new(&item.id, &item.title, query, item.horizon)
                        .with_tier(tier_for(item.horizon))
                })
            })
            .collect();

        debug!(
            stage = %StageName::Roadmap,
            ready = reply.ready,
            confidence = reply.confidence,
            items = reply.attention.items.len(),
            proposals = proposals.len(),
            "roadmap evaluation finished"
        );

        let attention = AttentionPayload::Roadmap(reply.attention);
        let report = if reply.ready {
            StageReport::ready(reply.confidence, attention)
        } else {
            StageReport::needs_input(reply.confidence, reply.missing, attention)
        };
        Ok(report.with_proposals(proposals))
    }
}

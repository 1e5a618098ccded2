//! Objectives stage: turn discovery notes into concrete objectives.

use super::{decode_reply, transcript, Agent, MissingInfo, StageReport};
use crate::context::{AttentionPayload, ObjectivesAttention, SessionContext, StageName};
use crate::errors::AgentFault;
use crate::providers::CompletionProvider;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const TRANSCRIPT_WINDOW: usize = 8;

/// Provider-backed agent for the objectives stage.
pub struct ObjectivesAgent {
    provider: Arc<dyn CompletionProvider>,
}

#[derive(Debug, Deserialize)]
struct ObjectivesReply {
    ready: bool,
    confidence: f64,
    #[serde(default)]
    missing: Vec<MissingInfo>,
    attention: ObjectivesAttention,
}

impl ObjectivesAgent {
    /// Creates an objectives agent over the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    fn prompt(&self, ctx: &SessionContext, input: Option<&str>) -> String {
        let mut prompt = String::from(
            "You are the objectives specialist in a collaborative planning session. \
             Translate the discovery notes into a small set of objectives, each with \
             a title, a concrete outcome, and a horizon (strategic, tactical, or \
             execution). Report readiness, confidence, and missing categories.\n\n",
        );
        if let Some(discovery) = ctx.attention().discovery() {
            if let Ok(json) = serde_json::to_string(discovery) {
                prompt.push_str("Discovery notes:\n");
                prompt.push_str(&json);
                prompt.push_str("\n\n");
            }
        }
        if let Some(prior) = ctx.attention().objectives() {
            if let Ok(json) = serde_json::to_string(prior) {
                prompt.push_str("Prior objectives:\n");
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
                    "required": ["objectives"],
                    "properties": {
                        "objectives": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["title", "outcome", "horizon"],
                                "properties": {
                                    "title": { "type": "string" },
                                    "outcome": { "type": "string" },
                                    "horizon": {
                                        "enum": ["strategic", "tactical", "execution"]
                                    }
                                }
                            }
                        },
                        "guiding_theme": { "type": "string" }
                    }
                }
            }
        })
    }
}

impl fmt::Debug for ObjectivesAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectivesAgent").finish_non_exhaustive()
    }
}

#[async_trait]
impl Agent for ObjectivesAgent {
    fn stage(&self) -> StageName {
        StageName::Objectives
    }

    async fn evaluate(
        &self,
        ctx: &SessionContext,
        input: Option<&str>,
    ) -> Result<StageReport, AgentFault> {
        let prompt = self.prompt(ctx, input);
        let schema = Self::reply_schema();
        let completion = self.provider.complete(&prompt, &schema).await?;
        let reply: ObjectivesReply = decode_reply(completion.value, StageName::Objectives)?;

        debug!(
            stage = %StageName::Objectives,
            ready = reply.ready,
            confidence = reply.confidence,
            objectives = reply.attention.objectives.len(),
            "objectives evaluation finished"
        );

        let attention = AttentionPayload::Objectives(reply.attention);
        let report = if reply.ready {
            StageReport::ready(reply.confidence, attention)
        } else {
            StageReport::needs_input(reply.confidence, reply.missing, attention)
        };
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DiscoveryAttention, SessionSeed};
    use crate::testing::ScriptedCompletionProvider;

    #[tokio::test]
    async fn test_objectives_reply_maps_to_report() {
        let provider = Arc::new(ScriptedCompletionProvider::new());
        provider.push_value(serde_json::json!({
            "ready": true,
            "confidence": 0.9,
            "attention": {
                "objectives": [
                    {
                        "title": "Secure a research internship",
                        "outcome": "offer in hand before spring",
                        "horizon": "tactical"
                    }
                ],
                "guiding_theme": "move toward climate research"
            }
        }));

        let agent = ObjectivesAgent::new(provider);
        let ctx = SessionContext::new(SessionSeed::new("set goals with me"));
        let report = agent.evaluate(&ctx, None).await.unwrap();

        assert!(report.ready);
        assert_eq!(report.attention.stage(), StageName::Objectives);
    }

    #[tokio::test]
    async fn test_prompt_carries_discovery_notes() {
        let provider = Arc::new(ScriptedCompletionProvider::new());
        provider.push_value(serde_json::json!({
            "ready": false,
            "confidence": 0.6,
            "attention": { "objectives": [] }
        }));

        let agent = ObjectivesAgent::new(provider.clone());
        let mut ctx = SessionContext::new(SessionSeed::new("set goals with me"));
        ctx.attention_mut()
            .apply(AttentionPayload::Discovery(DiscoveryAttention {
                situation: "final-year physics student".into(),
                ..DiscoveryAttention::default()
            }));

        agent.evaluate(&ctx, None).await.unwrap();

        let prompts = provider.recorded_prompts();
        assert!(prompts[0].contains("final-year physics student"));
    }
}

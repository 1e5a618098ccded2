//! Discovery stage: distill who the collaborator is and what they want.

use super::{decode_reply, transcript, Agent, MissingInfo, StageReport};
use crate::context::{AttentionPayload, DiscoveryAttention, SessionContext, StageName};
use crate::errors::AgentFault;
use crate::providers::CompletionProvider;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const TRANSCRIPT_WINDOW: usize = 12;

/// Provider-backed agent for the discovery stage.
pub struct DiscoveryAgent {
    provider: Arc<dyn CompletionProvider>,
}

#[derive(Debug, Deserialize)]
struct DiscoveryReply {
    ready: bool,
    confidence: f64,
    #[serde(default)]
    missing: Vec<MissingInfo>,
    attention: DiscoveryAttention,
}

impl DiscoveryAgent {
    /// Creates a discovery agent over the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    fn prompt(&self, ctx: &SessionContext, input: Option<&str>) -> String {
        let mut prompt = String::from(
            "You are the discovery specialist in a collaborative planning session. \
             Distill the collaborator's current situation, aspirations, constraints, \
             and open threads from the conversation so far. Report whether discovery \
             is complete, your confidence, and any missing categories.\n\n",
        );
        if let Some(prior) = ctx.attention().discovery() {
            if let Ok(json) = serde_json::to_string(prior) {
                prompt.push_str("Prior discovery notes:\n");
                prompt.push_str(&json);
                prompt.push_str("\n\n");
            }
        }
        prompt.push_str("Conversation:\n");
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
                    "required": ["situation"],
                    "properties": {
                        "situation": { "type": "string" },
                        "aspirations": { "type": "array", "items": { "type": "string" } },
                        "constraints": { "type": "array", "items": { "type": "string" } },
                        "open_threads": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        })
    }
}

impl fmt::Debug for DiscoveryAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryAgent").finish_non_exhaustive()
    }
}

#[async_trait]
impl Agent for DiscoveryAgent {
    fn stage(&self) -> StageName {
        StageName::Discovery
    }

    async fn evaluate(
        &self,
        ctx: &SessionContext,
        input: Option<&str>,
    ) -> Result<StageReport, AgentFault> {
        let prompt = self.prompt(ctx, input);
        let schema = Self::reply_schema();
        let completion = self.provider.complete(&prompt, &schema).await?;
        let reply: DiscoveryReply = decode_reply(completion.value, StageName::Discovery)?;

        debug!(
            stage = %StageName::Discovery,
            ready = reply.ready,
            confidence = reply.confidence,
            model = %completion.model,
            "discovery evaluation finished"
        );

        let attention = AttentionPayload::Discovery(reply.attention);
        let report = if reply.ready {
            StageReport::ready(reply.confidence, attention)
        } else {
            StageReport::needs_input(reply.confidence, reply.missing, attention)
        };
        Ok(report)
    }
}

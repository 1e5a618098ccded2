//! The session context and the seed it grows from.

use super::{AttentionMap, Exchange, HistoryLog, WorkflowState};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The immutable configuration snapshot a session starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSeed {
    /// The collaborator's opening message.
    pub opening_message: String,
    /// Where the session originated (e.g. "web").
    pub channel: String,
    /// Free-form metadata captured at intake.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SessionSeed {
    /// Creates a seed from an opening message, defaulting the channel to "web".
    #[must_use]
    pub fn new(opening_message: impl Into<String>) -> Self {
        Self {
            opening_message: opening_message.into(),
            channel: "web".to_string(),
            metadata: HashMap::new(),
        }
    }

    /// Sets the originating channel.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// The shared mutable record a pipeline pass works on.
///
/// One pass owns the context exclusively; the coordinator takes it as
/// `&mut`, so concurrent mutation is ruled out at compile time. The caller
/// creates it, lends it out per pass, persists it between passes through a
/// [`crate::providers::ContextStore`], and drops it when the session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    seed: SessionSeed,
    #[serde(default)]
    attention: AttentionMap,
    #[serde(default)]
    history: HistoryLog,
    #[serde(default)]
    workflow: WorkflowState,
}

impl SessionContext {
    /// Creates a fresh context. The seed's opening message becomes the first
    /// history entry so agents see one uniform conversation.
    #[must_use]
    pub fn new(seed: SessionSeed) -> Self {
        let mut history = HistoryLog::new();
        history.append(Exchange::user(seed.opening_message.clone()));

        Self {
            id: None,
            seed,
            attention: AttentionMap::new(),
            history,
            workflow: WorkflowState::new(),
        }
    }

    /// The persisted identity, if one has been assigned.
    #[must_use]
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Assigns the persisted identity. Set-once: a second assignment is an
    /// error even with the same value.
    pub fn assign_id(&mut self, id: Uuid) -> Result<(), ValidationError> {
        if let Some(existing) = self.id {
            return Err(ValidationError::new(
                "id",
                format!("session already has id {existing}"),
            ));
        }
        self.id = Some(id);
        Ok(())
    }

    /// The seed this session grew from.
    #[must_use]
    pub fn seed(&self) -> &SessionSeed {
        &self.seed
    }

    /// The attention map.
    #[must_use]
    pub fn attention(&self) -> &AttentionMap {
        &self.attention
    }

    /// Mutable attention map, for the coordinator's merge step.
    pub fn attention_mut(&mut self) -> &mut AttentionMap {
        &mut self.attention
    }

    /// The exchange history.
    #[must_use]
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Mutable history, for appends and the collaborator-facing reset.
    pub fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    /// The workflow position.
    #[must_use]
    pub fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    /// Mutable workflow state, for the coordinator's bookkeeping.
    pub fn workflow_mut(&mut self) -> &mut WorkflowState {
        &mut self.workflow
    }
}
